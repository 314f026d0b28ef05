use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::EntityKind;

/// Links a session to a wiki entry that was present in it.
///
/// `entity_id` points into the table selected by `kind`, so there is no
/// foreign key on it; rows are removed explicitly when the entry is merged away.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session_entity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub session_id: i32,
    pub kind: EntityKind,
    pub entity_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session_summary::Entity",
        from = "Column::SessionId",
        to = "super::session_summary::Column::Id",
        on_delete = "Cascade"
    )]
    SessionSummary,
}

impl Related<super::session_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionSummary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
