use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Enquiries {
    Table,
    Remark,
}

#[derive(DeriveIden)]
enum CallbackRequests {
    Table,
    Remark,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("enquiries", "remark").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Enquiries::Table)
                        .add_column(ColumnDef::new(Enquiries::Remark).text().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("callback_requests", "remark").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(CallbackRequests::Table)
                        .add_column(ColumnDef::new(CallbackRequests::Remark).text().null())
                        .to_owned(),
                )
                .await?;
        }

        // Admin lists sort by newest first
        let stmt = sea_orm::Statement::from_string(
            manager.get_database_backend(),
            "CREATE INDEX IF NOT EXISTS idx_enquiries_created_at ON enquiries(created_at DESC)"
                .to_owned(),
        );
        manager.get_connection().execute(stmt).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(CallbackRequests::Table)
                    .drop_column(CallbackRequests::Remark)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Enquiries::Table)
                    .drop_column(Enquiries::Remark)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
