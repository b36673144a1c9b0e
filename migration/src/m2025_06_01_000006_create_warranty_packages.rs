//! Migration to create the warranty_packages table.
//!
//! Packages are authored in the master catalog and copied into tenant
//! databases on assignment. dealer_cost_cents and dealer_price_cents are
//! tenant-local overrides and are never touched by catalog propagation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WarrantyPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WarrantyPackages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WarrantyPackages::Name).text().not_null())
                    .col(ColumnDef::new(WarrantyPackages::Description).text().null())
                    .col(
                        ColumnDef::new(WarrantyPackages::CoverageLevel)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::DurationMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::RetailPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::DealerCostCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::DealerPriceCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(WarrantyPackages::CreatedById).uuid().null())
                    .col(
                        ColumnDef::new(WarrantyPackages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackages::UpdatedAt)
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
            .drop_table(Table::drop().table(WarrantyPackages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WarrantyPackages {
    Table,
    Id,
    Name,
    Description,
    CoverageLevel,
    DurationMonths,
    RetailPriceCents,
    DealerCostCents,
    DealerPriceCents,
    Active,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}
