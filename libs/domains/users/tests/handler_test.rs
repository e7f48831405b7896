//! Handler tests for the users domain
//!
//! Exercise the user routes in isolation against the in-memory store:
//! status codes, wire keys, headers and error bodies. Authentication and
//! the `/api/v1/users` prefix are added by the application, not here.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use domain_notifications::{
    BundledMessages, MailClient, NotificationRequest, NotificationResult, WelcomeDispatcher,
};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Router over a fresh in-memory store without notifications
fn app() -> Router {
    handlers::router(UserLifecycleService::new(InMemoryUserStore::new()), None)
}

async fn register(app: &Router, name: &str, email: &str) -> axum::response::Response {
    app.clone()
        .oneshot(request(
            "POST",
            "/register",
            Some(json!({ "full-name": name, "email": email })),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_returns_201_with_location() {
    let app = app();

    let response = register(&app, "Alex", "alex@demo.com").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/v1/users/1"
    );

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "id": 1, "full-name": "Alex", "email": "alex@demo.com" }));
}

#[tokio::test]
async fn test_register_duplicate_email_returns_409() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;

    let response = register(&app, "Alex2", "ALEX@demo.com").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "User with provided email already exists");
}

#[tokio::test]
async fn test_register_validates_input() {
    let response = register(&app(), "", "not-an-email").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["full-name"].is_array());
    assert!(body["details"]["email"].is_array());
}

#[tokio::test]
async fn test_get_user_and_missing_user() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;

    let response = app.clone().oneshot(request("GET", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user: UserView = json_body(response.into_body()).await;
    assert_eq!(user.name, "Alex");

    let response = app.oneshot(request("GET", "/42", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "User not found with id:42");
}

#[tokio::test]
async fn test_get_user_with_non_numeric_id_returns_400() {
    let response = app().oneshot(request("GET", "/abc", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_bulk_get_reports_missing_count() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;
    register(&app, "Sam", "sam@demo.com").await;

    let response = app
        .clone()
        .oneshot(request("POST", "/", Some(json!([1, 2]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<UserView> = json_body(response.into_body()).await;
    assert_eq!(users.len(), 2);

    let response = app
        .clone()
        .oneshot(request("POST", "/", Some(json!([1, 7, 8]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "2 users were not found");

    let response = app
        .oneshot(request("POST", "/", Some(json!([]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "At least one id should be provided");
}

#[tokio::test]
async fn test_update_single_and_multiple() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;
    register(&app, "Sam", "sam@demo.com").await;

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/update/single",
            Some(json!({ "id": 1, "full-name": "Alex Smith" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/update/multiple",
            Some(json!([
                { "id": 1, "full-name": "Alex Jones" },
                { "id": 2, "full-name": "Sam Jones" }
            ])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request("GET", "/", None)).await.unwrap();
    let users: Vec<UserView> = json_body(response.into_body()).await;
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Alex Jones", "Sam Jones"]);
}

#[tokio::test]
async fn test_update_multiple_empty_returns_400() {
    let response = app()
        .oneshot(request("PATCH", "/update/multiple", Some(json!([]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "At least one user must be provided");
}

#[tokio::test]
async fn test_update_unknown_user_returns_404() {
    let response = app()
        .oneshot(request(
            "PATCH",
            "/update/single",
            Some(json!({ "id": 5, "full-name": "Ghost" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "User was not found");
}

#[tokio::test]
async fn test_delete_hides_user_and_frees_email() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;

    let response = app.clone().oneshot(request("DELETE", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(request("GET", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = register(&app, "Alex3", "alex@demo.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/v1/users/2"
    );
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = app();
    register(&app, "Alex", "alex@demo.com").await;
    register(&app, "Sam", "sam@demo.com").await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/", Some(json!([1, 3]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/", Some(json!([1, 2]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request("GET", "/", None)).await.unwrap();
    let users: Vec<UserView> = json_body(response.into_body()).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_malformed_id_list_returns_400() {
    let response = app()
        .oneshot(request("DELETE", "/", Some(json!({ "ids": [1] }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Mail client that forwards every request to a channel
struct ChannelMailClient {
    sent: mpsc::UnboundedSender<NotificationRequest>,
}

#[async_trait]
impl MailClient for ChannelMailClient {
    async fn send(&self, request: &NotificationRequest) -> NotificationResult<()> {
        self.sent.send(request.clone()).ok();
        Ok(())
    }
}

#[tokio::test]
async fn test_register_sends_localized_welcome() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = WelcomeDispatcher::new(
        Arc::new(ChannelMailClient { sent: tx }),
        Arc::new(BundledMessages::new()),
        "registry@demo.com",
    );
    let app = handlers::router(
        UserLifecycleService::new(InMemoryUserStore::new()),
        Some(dispatcher),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("content-type", "application/json")
                .header("accept-language", "de-DE,de;q=0.9")
                .body(Body::from(
                    json!({ "full-name": "Alex", "email": "alex@demo.com" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let email = rx.recv().await.unwrap();
    assert_eq!(email.from, "registry@demo.com");
    assert_eq!(email.to, "alex@demo.com");
    assert_eq!(email.subject, "Willkommen!");
    assert!(email.body.contains("Alex"));
    assert!(email.body.contains("alex@demo.com"));
}

#[tokio::test]
async fn test_failed_registration_sends_nothing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = WelcomeDispatcher::new(
        Arc::new(ChannelMailClient { sent: tx }),
        Arc::new(BundledMessages::new()),
        "registry@demo.com",
    );
    let app = handlers::router(
        UserLifecycleService::new(InMemoryUserStore::new()),
        Some(dispatcher),
    );
    register(&app, "Alex", "alex@demo.com").await;
    rx.recv().await.unwrap();

    let response = register(&app, "Alex2", "alex@demo.com").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    drop(app);
    assert!(rx.recv().await.is_none());
}

/// Store that persists nothing and never assigns ids
struct UnnumberedStore;

#[async_trait]
impl UserStore for UnnumberedStore {
    async fn find_active(&self) -> UserResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn find_active_by_ids(&self, _ids: &[UserId]) -> UserResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn find_active_by_id(&self, _id: UserId) -> UserResult<Option<User>> {
        Ok(None)
    }

    async fn find_active_by_email(&self, _email: &str) -> UserResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: UserId) -> UserResult<Option<User>> {
        Ok(None)
    }

    async fn find_all_by_ids(&self, _ids: &[UserId]) -> UserResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn save(&self, user: User) -> UserResult<User> {
        Ok(user)
    }

    async fn save_all(&self, users: Vec<User>) -> UserResult<Vec<User>> {
        Ok(users)
    }
}

#[tokio::test]
async fn test_register_without_assigned_id_returns_500() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = WelcomeDispatcher::new(
        Arc::new(ChannelMailClient { sent: tx }),
        Arc::new(BundledMessages::new()),
        "registry@demo.com",
    );
    let app = handlers::router(UserLifecycleService::new(UnnumberedStore), Some(dispatcher));

    let response = register(&app, "Alex", "alex@demo.com").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INTERNAL_ERROR");

    drop(app);
    assert!(rx.recv().await.is_none());
}
