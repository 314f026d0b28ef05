use lorekeeper_entity::{campaign, character, location, organization, session_summary};
use serde::Serialize;
use utoipa::ToSchema;

use crate::wiki::enhance::EnhanceOutcome;
use crate::wiki::ingest::IngestOutcome;
use crate::wiki::kind::NameRef;
use crate::wiki::merge::MergeOutcome;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: campaign::Model,
    pub session_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: campaign::Model,
    /// ordered by session number
    pub sessions: Vec<session_summary::Model>,
}

/// Pickers for the organization editor.
#[derive(Serialize, ToSchema)]
pub struct CampaignLists {
    pub characters: Vec<NameRef>,
    pub locations: Vec<NameRef>,
}

#[derive(Serialize, ToSchema)]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: organization::Model,
    pub leader: Option<character::Model>,
    pub headquarters: Option<location::Model>,
    pub members: Vec<character::Model>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: session_summary::Model,
    pub characters: Vec<NameRef>,
    pub locations: Vec<NameRef>,
    pub organizations: Vec<NameRef>,
    pub items: Vec<NameRef>,
    pub lore: Vec<NameRef>,
}

#[derive(Serialize, ToSchema)]
pub struct MergeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: MergeOutcome,
}

#[derive(Serialize, ToSchema)]
pub struct ReplaceResponse {
    pub message: String,
    pub count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct GenerateResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

#[derive(Serialize, ToSchema)]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: EnhanceOutcome,
}
