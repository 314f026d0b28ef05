use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The five wiki entity kinds that can be merged and linked to a session.
///
/// Stored verbatim in `session_entity.kind`; parsed case-insensitively from
/// request parameters such as `?type=character`.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
    #[sea_orm(string_value = "Character")]
    Character,
    #[sea_orm(string_value = "Location")]
    Location,
    #[sea_orm(string_value = "Organization")]
    Organization,
    #[sea_orm(string_value = "Item")]
    Item,
    #[sea_orm(string_value = "Lore")]
    Lore,
}
