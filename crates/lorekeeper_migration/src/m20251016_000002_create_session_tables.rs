use sea_orm_migration::prelude::*;

use crate::m20251016_000001_create_wiki_tables::{Campaign, Character, Organization};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SessionSummary::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionSummary::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionSummary::CampaignId).integer().not_null())
                    .col(ColumnDef::new(SessionSummary::SessionNumber).integer().not_null())
                    .col(ColumnDef::new(SessionSummary::Title).string().not_null())
                    .col(ColumnDef::new(SessionSummary::ChapterTitle).string())
                    .col(ColumnDef::new(SessionSummary::Recap).text())
                    .col(ColumnDef::new(SessionSummary::Outline).text())
                    .col(ColumnDef::new(SessionSummary::Notes).text())
                    .col(ColumnDef::new(SessionSummary::NotableQuotes).json())
                    .col(ColumnDef::new(SessionSummary::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SessionSummary::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_summary_campaign")
                            .from(SessionSummary::Table, SessionSummary::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_session_summary_campaign_number")
                    .table(SessionSummary::Table)
                    .col(SessionSummary::CampaignId)
                    .col(SessionSummary::SessionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionEntity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionEntity::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionEntity::SessionId).integer().not_null())
                    .col(ColumnDef::new(SessionEntity::Kind).string().not_null())
                    .col(ColumnDef::new(SessionEntity::EntityId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_entity_session")
                            .from(SessionEntity::Table, SessionEntity::SessionId)
                            .to(SessionSummary::Table, SessionSummary::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // linking is additive, duplicate inserts are ignored against this index
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_session_entity_unique")
                    .table(SessionEntity::Table)
                    .col(SessionEntity::SessionId)
                    .col(SessionEntity::Kind)
                    .col(SessionEntity::EntityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_session_entity_kind_entity")
                    .table(SessionEntity::Table)
                    .col(SessionEntity::Kind)
                    .col(SessionEntity::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationMember::OrganizationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationMember::CharacterId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(OrganizationMember::OrganizationId)
                            .col(OrganizationMember::CharacterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_member_organization")
                            .from(OrganizationMember::Table, OrganizationMember::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_member_character")
                            .from(OrganizationMember::Table, OrganizationMember::CharacterId)
                            .to(Character::Table, Character::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_member_character")
                    .table(OrganizationMember::Table)
                    .col(OrganizationMember::CharacterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionEntity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionSummary::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SessionSummary {
    Table,
    Id,
    CampaignId,
    SessionNumber,
    Title,
    ChapterTitle,
    Recap,
    Outline,
    Notes,
    NotableQuotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SessionEntity {
    Table,
    Id,
    SessionId,
    Kind,
    EntityId,
}

#[derive(DeriveIden)]
enum OrganizationMember {
    Table,
    OrganizationId,
    CharacterId,
}
