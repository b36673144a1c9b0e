//! Migration to create the dealers table.
//!
//! A dealer row is the business identity of a tenant. The connection fields
//! (database_name, db_url, provisioned_at) stay null until provisioning
//! completes successfully.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dealers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dealers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dealers::LegalName).text().not_null())
                    .col(ColumnDef::new(Dealers::TradingName).text().null())
                    .col(
                        ColumnDef::new(Dealers::Email)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Dealers::Phone).text().null())
                    .col(ColumnDef::new(Dealers::AddressLine).text().null())
                    .col(ColumnDef::new(Dealers::City).text().null())
                    .col(ColumnDef::new(Dealers::PasswordHash).text().null())
                    .col(
                        ColumnDef::new(Dealers::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Dealers::DatabaseName).text().null())
                    .col(ColumnDef::new(Dealers::DbUrl).text().null())
                    .col(
                        ColumnDef::new(Dealers::ProvisionedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Dealers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Dealers::UpdatedAt)
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
            .drop_table(Table::drop().table(Dealers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Dealers {
    Table,
    Id,
    LegalName,
    TradingName,
    Email,
    Phone,
    AddressLine,
    City,
    PasswordHash,
    Status,
    DatabaseName,
    DbUrl,
    ProvisionedAt,
    CreatedAt,
    UpdatedAt,
}
