use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::utils::lenient::{deserialize_patch_field, deserialize_patch_i32};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub campaign_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// `Character`, `Location`, `Organization`, `Item` or `Lore`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReplaceRequest {
    #[serde(default)]
    pub find: Option<String>,
    #[serde(default)]
    pub replace: Option<String>,
}

/// Curated notes pasted from an external note-taking tool.
///
/// Older clients also send `campaignId`; it is ignored since the campaign is
/// read from the stored session.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    #[serde(default)]
    pub recap: Option<String>,
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub quotes: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub current_storybook: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntitiesQuery {
    /// entity kind, matched case-insensitively
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// PATCH bodies: an absent field keeps the stored value, `null` clears it.

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub species: Option<Option<String>>,
    #[serde(rename = "class", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub class_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub level: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub hp: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub ac: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<i32>)]
    pub origin_id: Option<Option<i32>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_i32")]
    #[schema(value_type = Option<i32>)]
    pub founding_year: Option<Option<i32>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub rarity: Option<Option<String>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoreRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub tag: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub founding: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<i32>)]
    pub leader_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<i32>)]
    pub headquarters_id: Option<Option<i32>>,
    /// replaces the whole member set when present
    #[serde(default)]
    pub member_ids: Option<Vec<i32>>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub chapter_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub recap: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub outline: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}
