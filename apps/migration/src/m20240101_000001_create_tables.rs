use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    DisplayName,
    PasswordHash,
    Roles,
    EnabledMedia,
    PhotoUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Content,
    ImageUrl,
    SourceUrl,
    Status,
    SuggestedTime,
    ScheduledTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
    Kind,
    Code,
    Title,
    Logo,
    Enabled,
    ApiKey,
    Sources,
    CreatedAt,
    UpdatedAt,
}

fn timestamps<T: IntoIden>(table: &mut TableCreateStatement, created: T, updated: T) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut users = Table::create();
        users
            .table(Users::Table)
            .if_not_exists()
            .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
            .col(ColumnDef::new(Users::Username).string().null().unique_key())
            .col(ColumnDef::new(Users::FirstName).string().null())
            .col(ColumnDef::new(Users::LastName).string().null())
            .col(ColumnDef::new(Users::DisplayName).string().not_null())
            .col(ColumnDef::new(Users::PasswordHash).string().not_null())
            .col(ColumnDef::new(Users::Roles).text().not_null().default(""))
            .col(ColumnDef::new(Users::EnabledMedia).text().not_null().default(""))
            .col(ColumnDef::new(Users::PhotoUrl).string().null());
        timestamps(&mut users, Users::CreatedAt, Users::UpdatedAt);
        manager.create_table(users).await?;

        let mut posts = Table::create();
        posts
            .table(Posts::Table)
            .if_not_exists()
            .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Posts::Title).string().not_null())
            .col(ColumnDef::new(Posts::Content).text().not_null())
            .col(ColumnDef::new(Posts::ImageUrl).string().null())
            .col(ColumnDef::new(Posts::SourceUrl).string().null())
            .col(
                ColumnDef::new(Posts::Status)
                    .text()
                    .not_null()
                    .default("waiting"),
            )
            .col(ColumnDef::new(Posts::SuggestedTime).timestamp_with_time_zone().null())
            .col(ColumnDef::new(Posts::ScheduledTime).timestamp_with_time_zone().null());
        timestamps(&mut posts, Posts::CreatedAt, Posts::UpdatedAt);
        manager.create_table(posts).await?;

        // Status lists and the publish sweep.
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_status_scheduled_time")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .col(Posts::ScheduledTime)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let mut providers = Table::create();
        providers
            .table(Providers::Table)
            .if_not_exists()
            .col(ColumnDef::new(Providers::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Providers::Kind).text().not_null())
            .col(ColumnDef::new(Providers::Code).string().not_null())
            .col(ColumnDef::new(Providers::Title).string().not_null())
            .col(ColumnDef::new(Providers::Logo).string().not_null().default(""))
            .col(ColumnDef::new(Providers::Enabled).boolean().not_null().default(true))
            .col(ColumnDef::new(Providers::ApiKey).string().null())
            .col(ColumnDef::new(Providers::Sources).text().not_null().default(""));
        timestamps(&mut providers, Providers::CreatedAt, Providers::UpdatedAt);
        manager.create_table(providers).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_providers_kind_code")
                    .table(Providers::Table)
                    .col(Providers::Kind)
                    .col(Providers::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Providers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}
