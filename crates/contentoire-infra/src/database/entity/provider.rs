//! Provider entity for SeaORM. `(kind, code)` is unique.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use contentoire_core::domain::{Provider, ProviderKind};

use super::{join_list, split_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Kind {
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "auth")]
    Auth,
    #[sea_orm(string_value = "media")]
    Media,
    #[sea_orm(string_value = "rss")]
    Rss,
}

impl From<Kind> for ProviderKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::News => Self::News,
            Kind::Auth => Self::Auth,
            Kind::Media => Self::Media,
            Kind::Rss => Self::Rss,
        }
    }
}

impl From<ProviderKind> for Kind {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::News => Self::News,
            ProviderKind::Auth => Self::Auth,
            ProviderKind::Media => Self::Media,
            ProviderKind::Rss => Self::Rss,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: Kind,
    pub code: String,
    pub title: String,
    pub logo: String,
    pub enabled: bool,
    pub api_key: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub sources: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Provider {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind.into(),
            code: model.code,
            title: model.title,
            logo: model.logo,
            enabled: model.enabled,
            api_key: model.api_key,
            sources: split_list(&model.sources),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Provider> for ActiveModel {
    fn from(provider: Provider) -> Self {
        Self {
            id: Set(provider.id),
            kind: Set(provider.kind.into()),
            code: Set(provider.code),
            title: Set(provider.title),
            logo: Set(provider.logo),
            enabled: Set(provider.enabled),
            api_key: Set(provider.api_key),
            sources: Set(join_list(&provider.sources)),
            created_at: Set(provider.created_at.into()),
            updated_at: Set(provider.updated_at.into()),
        }
    }
}
