use std::collections::BTreeSet;

use anyhow::Result;
use lorekeeper_entity::{campaign, session_summary, EntityKind};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::ai::extraction::{
    parse_extraction, ExtractedCharacter, ExtractedItem, ExtractedLocation, ExtractedLore, ExtractedOrganization,
    Extraction,
};
use crate::ai::prompt::extraction_prompt;
use crate::ai::{GenerationRequest, TextGenerator};
use crate::api::error::InnerApiError;
use crate::database::begin_write_transaction;
use crate::utils::time_format::now_standard_string;
use crate::wiki::links::link_session;
use crate::wiki::quotes::{normalize_quotes, quotes_to_json};
use crate::wiki::upsert::{upsert, CharacterFields, ItemFields, LocationFields, LoreFields, OrganizationFields};

/// Number of distinct entries of each kind touched by one ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntityCounts {
    pub characters: usize,
    pub locations: usize,
    pub organizations: usize,
    pub items: usize,
    pub lore: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub campaign_id: i32,
    pub session_id: i32,
    pub session_number: i32,
    pub counts: EntityCounts,
}

impl From<ExtractedCharacter> for CharacterFields {
    fn from(value: ExtractedCharacter) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            kind: value.kind,
            description: value.description,
            species: value.species,
            class_name: value.class_name,
            level: value.level,
            hp: value.hp,
            ac: value.ac,
            status: value.status,
        }
    }
}

impl From<ExtractedLocation> for LocationFields {
    fn from(value: ExtractedLocation) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            kind: value.kind,
            description: value.description,
            founding_year: value.founding_year,
        }
    }
}

impl From<ExtractedOrganization> for OrganizationFields {
    fn from(value: ExtractedOrganization) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            kind: value.kind,
            description: value.description,
        }
    }
}

impl From<ExtractedItem> for ItemFields {
    fn from(value: ExtractedItem) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            kind: value.kind,
            description: value.description,
            rarity: value.rarity,
        }
    }
}

impl From<ExtractedLore> for LoreFields {
    fn from(value: ExtractedLore) -> Self {
        Self {
            title: value.title.unwrap_or_default(),
            kind: value.kind,
            tag: value.tag,
            description: value.description,
        }
    }
}

async fn find_or_create_campaign<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i32> {
    if let Some(existing) = campaign::Entity::find()
        .filter(campaign::Column::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }
    info!("creating campaign \"{}\"", name);
    let created = campaign::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now_standard_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(created.id)
}

/// Highest session number of the campaign plus one.
pub async fn next_session_number<C: ConnectionTrait>(conn: &C, campaign_id: i32) -> Result<i32> {
    let max: Option<i32> = session_summary::Entity::find()
        .select_only()
        .column_as(Expr::col(session_summary::Column::SessionNumber).max(), "max_number")
        .filter(session_summary::Column::CampaignId.eq(campaign_id))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?
        .flatten();
    Ok(max.unwrap_or(0) + 1)
}

/// Writes an extraction into the campaign as a new session plus upserted entries.
pub async fn store_extraction(db: &DatabaseConnection, campaign_name: &str, extraction: Extraction) -> Result<IngestOutcome> {
    let txn = begin_write_transaction(db).await?;
    let campaign_id = find_or_create_campaign(&txn, campaign_name).await?;

    let mut characters = BTreeSet::new();
    for entry in extraction.characters {
        characters.extend(upsert(&txn, campaign_id, CharacterFields::from(entry)).await?);
    }
    let mut locations = BTreeSet::new();
    for entry in extraction.locations {
        locations.extend(upsert(&txn, campaign_id, LocationFields::from(entry)).await?);
    }
    let mut organizations = BTreeSet::new();
    for entry in extraction.organizations {
        organizations.extend(upsert(&txn, campaign_id, OrganizationFields::from(entry)).await?);
    }
    let mut items = BTreeSet::new();
    for entry in extraction.items {
        items.extend(upsert(&txn, campaign_id, ItemFields::from(entry)).await?);
    }
    let mut lore = BTreeSet::new();
    for entry in extraction.lore {
        lore.extend(upsert(&txn, campaign_id, LoreFields::from(entry)).await?);
    }

    let session_number = next_session_number(&txn, campaign_id).await?;
    let summary = extraction.session_summary.unwrap_or_default();
    let now = now_standard_string();
    let session = session_summary::ActiveModel {
        campaign_id: Set(campaign_id),
        session_number: Set(session_number),
        title: Set(summary
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("Session {}", session_number))),
        chapter_title: Set(summary.chapter_title),
        recap: Set(summary.recap),
        outline: Set(summary.outline),
        notable_quotes: Set(Some(quotes_to_json(&normalize_quotes(&summary.notable_quotes)))),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_session(&txn, session.id, EntityKind::Character, characters.iter().copied()).await?;
    link_session(&txn, session.id, EntityKind::Location, locations.iter().copied()).await?;
    link_session(&txn, session.id, EntityKind::Organization, organizations.iter().copied()).await?;
    link_session(&txn, session.id, EntityKind::Item, items.iter().copied()).await?;
    link_session(&txn, session.id, EntityKind::Lore, lore.iter().copied()).await?;

    txn.commit().await?;

    let counts = EntityCounts {
        characters: characters.len(),
        locations: locations.len(),
        organizations: organizations.len(),
        items: items.len(),
        lore: lore.len(),
    };
    info!(
        "stored session {} of campaign \"{}\": {:?}",
        session_number, campaign_name, counts
    );
    Ok(IngestOutcome {
        campaign_id,
        session_id: session.id,
        session_number,
        counts,
    })
}

/// Runs a transcript through the model and stores the result.
///
/// Single attempt, no retry. Calling it twice with the same transcript adds
/// a second session, while the entries themselves are updated in place.
pub async fn ingest_transcript(
    db: &DatabaseConnection,
    ai: &dyn TextGenerator,
    campaign_name: &str,
    transcript: &str,
) -> Result<IngestOutcome> {
    let campaign_name = campaign_name.trim();
    if transcript.trim().is_empty() {
        return Err(InnerApiError::BadRequest("Transcript is required".to_string()).into());
    }
    if campaign_name.is_empty() {
        return Err(InnerApiError::BadRequest("Campaign name is required".to_string()).into());
    }

    let raw = ai
        .generate(GenerationRequest::json(extraction_prompt(transcript)))
        .await?
        .ok_or(InnerApiError::EmptyAiResponse)?;
    debug!("raw AI response:\n{}", raw);

    let extraction = parse_extraction(&raw)?;
    store_extraction(db, campaign_name, extraction).await
}
