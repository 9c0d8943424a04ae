use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum SearchKeywords {
    Table,
    Id,
    Keyword,
    Region,
    Language,
    Category,
    SubCategory,
    Description,
    Enabled,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchKeywords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SearchKeywords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SearchKeywords::Keyword).string().not_null())
                    .col(
                        ColumnDef::new(SearchKeywords::Region)
                            .string()
                            .not_null()
                            .default("CA"),
                    )
                    .col(
                        ColumnDef::new(SearchKeywords::Language)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(SearchKeywords::Category).string().null())
                    .col(ColumnDef::new(SearchKeywords::SubCategory).string().null())
                    .col(ColumnDef::new(SearchKeywords::Description).text().null())
                    .col(
                        ColumnDef::new(SearchKeywords::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SearchKeywords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SearchKeywords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchKeywords::Table).if_exists().to_owned())
            .await
    }
}
