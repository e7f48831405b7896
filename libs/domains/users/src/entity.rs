use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `user_detail` table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_detail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::User {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            email: model.email,
            archived: model.archived,
        }
    }
}

impl From<crate::models::User> for ActiveModel {
    fn from(user: crate::models::User) -> Self {
        use sea_orm::ActiveValue::{NotSet, Set};

        ActiveModel {
            id: user.id.map_or(NotSet, Set),
            name: Set(user.name),
            email: Set(user.email),
            archived: Set(user.archived),
        }
    }
}
