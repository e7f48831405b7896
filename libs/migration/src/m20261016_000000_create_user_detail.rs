use sea_orm_migration::{prelude::*, schema::*};

const ACTIVE_EMAIL_INDEX: &str = "ux_user_detail_active_email";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserDetail::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserDetail::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(UserDetail::Name, 250))
                    .col(string_len(UserDetail::Email, 320))
                    .col(boolean(UserDetail::Archived).default(false))
                    .to_owned(),
            )
            .await?;

        // Only active rows count toward email uniqueness, so an archived
        // address can be registered again.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_EMAIL_INDEX} \
                 ON user_detail (lower(email)) WHERE archived = false"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {ACTIVE_EMAIL_INDEX}"))
            .await?;

        manager
            .drop_table(Table::drop().table(UserDetail::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserDetail {
    Table,
    Id,
    Name,
    Email,
    Archived,
}
