use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Registry API",
        description = "Registration and lifecycle management of users. All routes require HTTP basic authentication."
    ),
    nest(
        (path = "/api/v1/users", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
