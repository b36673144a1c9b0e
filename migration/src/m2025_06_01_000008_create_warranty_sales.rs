//! Migration to create the warranty_sales table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WarrantySales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WarrantySales::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WarrantySales::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(WarrantySales::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(WarrantySales::PackageId).uuid().not_null())
                    .col(ColumnDef::new(WarrantySales::DealerId).uuid().null())
                    .col(ColumnDef::new(WarrantySales::SoldByUserId).uuid().null())
                    .col(
                        ColumnDef::new(WarrantySales::SalePriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantySales::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(WarrantySales::SoldAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantySales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_warranty_sales_customer")
                            .from(WarrantySales::Table, WarrantySales::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_warranty_sales_sold_at")
                    .table(WarrantySales::Table)
                    .col(WarrantySales::SoldAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WarrantySales::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WarrantySales {
    Table,
    Id,
    CustomerId,
    VehicleId,
    PackageId,
    DealerId,
    SoldByUserId,
    SalePriceCents,
    Status,
    SoldAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
}
