//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use contentoire_core::domain::User;

use super::{join_list, split_list};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub password_hash: String,
    pub roles: String,
    pub enabled_media: String,
    pub photo_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            display_name: model.display_name,
            password_hash: model.password_hash,
            roles: split_list(&model.roles),
            enabled_media: split_list(&model.enabled_media),
            photo_url: model.photo_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            email: Set(user.email),
            username: Set(user.username),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            display_name: Set(user.display_name),
            password_hash: Set(user.password_hash),
            roles: Set(join_list(&user.roles)),
            enabled_media: Set(join_list(&user.enabled_media)),
            photo_url: Set(user.photo_url),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
