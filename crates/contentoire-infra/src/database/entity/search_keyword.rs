//! Search keyword entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use contentoire_core::domain::SearchKeyword;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "search_keywords")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub keyword: String,
    pub region: String,
    pub language: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SearchKeyword {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            keyword: model.keyword,
            region: model.region,
            language: model.language,
            category: model.category,
            sub_category: model.sub_category,
            description: model.description,
            enabled: model.enabled,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<SearchKeyword> for ActiveModel {
    fn from(keyword: SearchKeyword) -> Self {
        Self {
            id: Set(keyword.id),
            keyword: Set(keyword.keyword),
            region: Set(keyword.region),
            language: Set(keyword.language),
            category: Set(keyword.category),
            sub_category: Set(keyword.sub_category),
            description: Set(keyword.description),
            enabled: Set(keyword.enabled),
            created_at: Set(keyword.created_at.into()),
            updated_at: Set(keyword.updated_at.into()),
        }
    }
}
