use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// A player character or NPC, unique per (name, campaign).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "character")]
#[serde(rename_all = "camelCase")]
#[schema(as = Character)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    /// "PC", "NPC" or free text
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub species: Option<String>,
    #[sea_orm(column_name = "class")]
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub level: Option<i32>,
    pub hp: Option<i32>,
    pub ac: Option<i32>,
    pub status: Option<String>,
    pub origin_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id",
        on_delete = "Cascade"
    )]
    Campaign,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::OriginId",
        to = "super::location::Column::Id",
        on_delete = "SetNull"
    )]
    Origin,
}

impl ActiveModelBehavior for ActiveModel {}
