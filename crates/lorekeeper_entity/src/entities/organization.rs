use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// A faction or group. `leader_id` and `headquarters_id` are optional one-way
/// references; membership lives in [`super::organization_member`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "organization")]
#[serde(rename_all = "camelCase")]
#[schema(as = Organization)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: Option<String>,
    pub founding: Option<String>,
    pub leader_id: Option<i32>,
    pub headquarters_id: Option<i32>,
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
        belongs_to = "super::character::Entity",
        from = "Column::LeaderId",
        to = "super::character::Column::Id",
        on_delete = "SetNull"
    )]
    Leader,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::HeadquartersId",
        to = "super::location::Column::Id",
        on_delete = "SetNull"
    )]
    Headquarters,
}

impl ActiveModelBehavior for ActiveModel {}
