//! Migration to create the tenant_databases mapping table.
//!
//! One row per successfully provisioned dealer. The connection registry
//! resolves dealer ids to connection URLs through this table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantDatabases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantDatabases::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TenantDatabases::DealerId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TenantDatabases::DatabaseName)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TenantDatabases::DbUrl).text().not_null())
                    .col(
                        ColumnDef::new(TenantDatabases::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(TenantDatabases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_databases_dealer")
                            .from(TenantDatabases::Table, TenantDatabases::DealerId)
                            .to(Dealers::Table, Dealers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantDatabases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantDatabases {
    Table,
    Id,
    DealerId,
    DatabaseName,
    DbUrl,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Dealers {
    Table,
    Id,
}
