//! Migration to create the warranty_package_items table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WarrantyPackageItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WarrantyPackageItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackageItems::PackageId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WarrantyPackageItems::Label)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WarrantyPackageItems::Detail).text().null())
                    .col(
                        ColumnDef::new(WarrantyPackageItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_warranty_package_items_package")
                            .from(
                                WarrantyPackageItems::Table,
                                WarrantyPackageItems::PackageId,
                            )
                            .to(WarrantyPackages::Table, WarrantyPackages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_warranty_package_items_package_id")
                    .table(WarrantyPackageItems::Table)
                    .col(WarrantyPackageItems::PackageId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WarrantyPackageItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WarrantyPackageItems {
    Table,
    Id,
    PackageId,
    Label,
    Detail,
    SortOrder,
}

#[derive(DeriveIden)]
enum WarrantyPackages {
    Table,
    Id,
}
