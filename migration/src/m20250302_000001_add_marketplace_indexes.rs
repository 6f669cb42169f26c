use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Gigs {
    Table,
    Status,
    ClientId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    GigId,
    FreelancerId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One bid per freelancer per gig.
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_gig_freelancer_unique")
                    .table(Bids::Table)
                    .col(Bids::GigId)
                    .col(Bids::FreelancerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Bids placed by a freelancer, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_freelancer_created_at")
                    .table(Bids::Table)
                    .col(Bids::FreelancerId)
                    .col(Bids::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Public listing filters on status and pages by created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_status_created_at")
                    .table(Gigs::Table)
                    .col(Gigs::Status)
                    .col(Gigs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_client_created_at")
                    .table(Gigs::Table)
                    .col(Gigs::ClientId)
                    .col(Gigs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bids_gig_freelancer_unique")
                    .table(Bids::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bids_freelancer_created_at")
                    .table(Bids::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_gigs_status_created_at")
                    .table(Gigs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_gigs_client_created_at")
                    .table(Gigs::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
