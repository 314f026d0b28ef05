use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Top-level container; every wiki entry belongs to exactly one campaign.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "campaign")]
#[serde(rename_all = "camelCase")]
#[schema(as = Campaign)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_summary::Entity")]
    SessionSummary,
}

impl Related<super::session_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionSummary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
