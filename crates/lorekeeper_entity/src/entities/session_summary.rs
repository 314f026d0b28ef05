use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// One played session: narrative recap, outline, notes and quote records.
///
/// `session_number` increases by one per campaign; entities present in the
/// session are linked through [`super::session_entity`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "session_summary")]
#[serde(rename_all = "camelCase")]
#[schema(as = SessionSummary)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub campaign_id: i32,
    pub session_number: i32,
    pub title: String,
    pub chapter_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub recap: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub outline: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    #[schema(value_type = Option<Object>)]
    pub notable_quotes: Option<Json>,
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
    #[sea_orm(has_many = "super::session_entity::Entity")]
    SessionEntity,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::session_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionEntity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
