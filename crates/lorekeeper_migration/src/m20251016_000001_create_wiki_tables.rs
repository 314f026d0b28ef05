use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Campaign::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaign::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campaign::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Campaign::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // character and organization both reference location
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Location::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Location::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Location::Name).string().not_null())
                    .col(ColumnDef::new(Location::Type).string())
                    .col(ColumnDef::new(Location::Description).text())
                    .col(ColumnDef::new(Location::FoundingYear).integer())
                    .col(ColumnDef::new(Location::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Location::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_campaign")
                            .from(Location::Table, Location::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Character::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Character::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Character::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Character::Name).string().not_null())
                    .col(ColumnDef::new(Character::Type).string())
                    .col(ColumnDef::new(Character::Description).text())
                    .col(ColumnDef::new(Character::Species).string())
                    .col(ColumnDef::new(Character::Class).string())
                    .col(ColumnDef::new(Character::Level).integer())
                    .col(ColumnDef::new(Character::Hp).integer())
                    .col(ColumnDef::new(Character::Ac).integer())
                    .col(ColumnDef::new(Character::Status).string())
                    .col(ColumnDef::new(Character::OriginId).integer())
                    .col(ColumnDef::new(Character::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Character::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_character_campaign")
                            .from(Character::Table, Character::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_character_origin")
                            .from(Character::Table, Character::OriginId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Organization::Name).string().not_null())
                    .col(ColumnDef::new(Organization::Type).string())
                    .col(ColumnDef::new(Organization::Description).text())
                    .col(ColumnDef::new(Organization::Status).string())
                    .col(ColumnDef::new(Organization::Founding).string())
                    .col(ColumnDef::new(Organization::LeaderId).integer())
                    .col(ColumnDef::new(Organization::HeadquartersId).integer())
                    .col(ColumnDef::new(Organization::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Organization::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_campaign")
                            .from(Organization::Table, Organization::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_leader")
                            .from(Organization::Table, Organization::LeaderId)
                            .to(Character::Table, Character::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_headquarters")
                            .from(Organization::Table, Organization::HeadquartersId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Item::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Item::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Item::Name).string().not_null())
                    .col(ColumnDef::new(Item::Type).string())
                    .col(ColumnDef::new(Item::Description).text())
                    .col(ColumnDef::new(Item::Rarity).string())
                    .col(ColumnDef::new(Item::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Item::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_campaign")
                            .from(Item::Table, Item::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lore::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lore::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lore::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Lore::Title).string().not_null())
                    .col(ColumnDef::new(Lore::Type).string())
                    .col(ColumnDef::new(Lore::Tag).string())
                    .col(ColumnDef::new(Lore::Description).text())
                    .col(ColumnDef::new(Lore::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Lore::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lore_campaign")
                            .from(Lore::Table, Lore::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one entry per name within a campaign
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_character_name_campaign")
                    .table(Character::Table)
                    .col(Character::Name)
                    .col(Character::CampaignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_location_name_campaign")
                    .table(Location::Table)
                    .col(Location::Name)
                    .col(Location::CampaignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_name_campaign")
                    .table(Organization::Table)
                    .col(Organization::Name)
                    .col(Organization::CampaignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_item_name_campaign")
                    .table(Item::Table)
                    .col(Item::Name)
                    .col(Item::CampaignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lore_title_campaign")
                    .table(Lore::Table)
                    .col(Lore::Title)
                    .col(Lore::CampaignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // merge repoints these columns in bulk
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_leader_id")
                    .table(Organization::Table)
                    .col(Organization::LeaderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_headquarters_id")
                    .table(Organization::Table)
                    .col(Organization::HeadquartersId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_character_origin_id")
                    .table(Character::Table)
                    .col(Character::OriginId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lore::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Item::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Character::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Campaign::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Campaign {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Character {
    Table,
    Id,
    CampaignId,
    Name,
    Type,
    Description,
    Species,
    Class,
    Level,
    Hp,
    Ac,
    Status,
    OriginId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Location {
    Table,
    Id,
    CampaignId,
    Name,
    Type,
    Description,
    FoundingYear,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Organization {
    Table,
    Id,
    CampaignId,
    Name,
    Type,
    Description,
    Status,
    Founding,
    LeaderId,
    HeadquartersId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Item {
    Table,
    Id,
    CampaignId,
    Name,
    Type,
    Description,
    Rarity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lore {
    Table,
    Id,
    CampaignId,
    Title,
    Type,
    Tag,
    Description,
    CreatedAt,
    UpdatedAt,
}
