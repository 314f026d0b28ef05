//! Folds curated session notes back into a stored session.

use std::collections::BTreeSet;

use anyhow::Result;
use lorekeeper_entity::{session_summary, EntityKind};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::ai::prompt::enhance_prompt;
use crate::ai::{GenerationRequest, TextGenerator};
use crate::api::error::InnerApiError;
use crate::database::begin_write_transaction;
use crate::utils::time_format::now_standard_string;
use crate::wiki::links::link_session;
use crate::wiki::notes_parser::parse_notes;
use crate::wiki::quotes::{parse_quotes_text, quotes_from_json, quotes_to_json, QuoteRecord};
use crate::wiki::upsert::{upsert, CharacterFields, ItemFields, LocationFields, OrganizationFields};

/// Curated notes for one session. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct EnhanceInput {
    pub recap: Option<String>,
    pub outline: Option<String>,
    pub quotes: Option<String>,
    pub notes: Option<String>,
    pub current_storybook: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceOutcome {
    pub enhanced_recap: Option<String>,
    pub outline: Option<String>,
    pub notes: Option<String>,
    pub quotes: Vec<QuoteRecord>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn description_of(description: &str) -> Option<String> {
    let description = description.trim();
    (!description.is_empty()).then(|| description.to_string())
}

async fn choose_recap(
    ai: &dyn TextGenerator,
    recap: Option<String>,
    storybook: Option<String>,
) -> Result<Option<String>> {
    Ok(match (recap, storybook) {
        (Some(recap), Some(storybook)) => {
            let enhanced = ai
                .generate(GenerationRequest::plain_text(enhance_prompt(&storybook, &recap)))
                .await?
                .filter(|text| !text.trim().is_empty());
            if enhanced.is_none() {
                warn!("AI returned no enhanced recap, keeping the current storybook");
            }
            Some(enhanced.unwrap_or(storybook))
        }
        (Some(recap), None) => Some(recap),
        (None, storybook) => storybook,
    })
}

pub async fn enhance_session(
    db: &DatabaseConnection,
    ai: &dyn TextGenerator,
    session_id: i32,
    input: EnhanceInput,
) -> Result<EnhanceOutcome> {
    let session = session_summary::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("Session {} not found", session_id)))?;
    let campaign_id = session.campaign_id;

    let new_recap = choose_recap(ai, present(input.recap), present(input.current_storybook)).await?;
    let quotes = present(input.quotes).map(|text| parse_quotes_text(&text));
    let notes_text = present(input.notes);
    let parsed = notes_text.as_deref().map(parse_notes).unwrap_or_default();

    let txn = begin_write_transaction(db).await?;
    let mut active = session.into_active_model();
    if let Some(recap) = new_recap {
        active.recap = Set(Some(recap));
    }
    if let Some(outline) = present(input.outline) {
        active.outline = Set(Some(outline));
    }
    if let Some(notes) = notes_text {
        active.notes = Set(Some(notes));
    }
    if let Some(quotes) = &quotes {
        active.notable_quotes = Set(Some(quotes_to_json(quotes)));
    }
    active.updated_at = Set(now_standard_string());
    let session = active.update(&txn).await?;

    let mut characters = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut organizations = BTreeSet::new();
    let mut items = BTreeSet::new();
    if !parsed.is_empty() {
        for entry in &parsed.characters {
            let fields = CharacterFields {
                name: entry.name.clone(),
                kind: Some(entry.kind.to_string()),
                description: description_of(&entry.description),
                ..Default::default()
            };
            characters.extend(upsert(&txn, campaign_id, fields).await?);
        }
        for entry in &parsed.locations {
            let fields = LocationFields {
                name: entry.name.clone(),
                description: description_of(&entry.description),
                ..Default::default()
            };
            locations.extend(upsert(&txn, campaign_id, fields).await?);
        }
        for entry in &parsed.organizations {
            let fields = OrganizationFields {
                name: entry.name.clone(),
                description: description_of(&entry.description),
                ..Default::default()
            };
            organizations.extend(upsert(&txn, campaign_id, fields).await?);
        }
        for entry in &parsed.items {
            let fields = ItemFields {
                name: entry.name.clone(),
                description: description_of(&entry.description),
                ..Default::default()
            };
            items.extend(upsert(&txn, campaign_id, fields).await?);
        }

        link_session(&txn, session_id, EntityKind::Character, characters.iter().copied()).await?;
        link_session(&txn, session_id, EntityKind::Location, locations.iter().copied()).await?;
        link_session(&txn, session_id, EntityKind::Organization, organizations.iter().copied()).await?;
        link_session(&txn, session_id, EntityKind::Item, items.iter().copied()).await?;
    }
    txn.commit().await?;

    info!(
        "enhanced session {}: {} characters, {} locations, {} organizations, {} items from notes, {} quotes",
        session_id,
        characters.len(),
        locations.len(),
        organizations.len(),
        items.len(),
        quotes.as_ref().map_or(0, Vec::len)
    );
    Ok(EnhanceOutcome {
        quotes: quotes_from_json(session.notable_quotes.as_ref()),
        enhanced_recap: session.recap,
        outline: session.outline,
        notes: session.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ResponseFormat;
    use crate::database::setup_test_database;
    use crate::wiki::links::entities_of_session;
    use crate::wiki::test_support::{create_campaign, create_character, create_session, CannedGenerator};
    use assert_matches::assert_matches;
    use lorekeeper_entity::character;
    use sea_orm::{ColumnTrait, QueryFilter};

    const NOTES: &str = "NPCS:\n- Sildar: A knight of the Lords' Alliance\nPLAYER CHARACTERS:\n- Lita: Halfling rogue\nITEMS:\n- Glasstaff: A staff of defense\nQUESTS:\n- Find Gundren: He was taken\n";

    #[tokio::test]
    async fn test_enhance_with_storybook_uses_ai() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session_id = create_session(&db, campaign_id, 1).await;
        let ai = CannedGenerator::new(vec![Some("A much better story.")]);

        let outcome = enhance_session(
            &db,
            &ai,
            session_id,
            EnhanceInput {
                recap: Some("Lita met Sildar.".to_string()),
                current_storybook: Some("Leeta met Sildur.".to_string()),
                quotes: Some(r#""Run!" (Lita's warning) and "Hold" (the guard)"#.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.enhanced_recap.as_deref(), Some("A much better story."));
        assert_eq!(outcome.quotes.len(), 2);
        assert_eq!(outcome.quotes[0].speaker.as_deref(), Some("Lita"));
        assert_eq!(outcome.quotes[1].speaker.as_deref(), Some("Unknown"));

        let requests = ai.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].format, ResponseFormat::PlainText);
        assert!(requests[0].prompt.contains("Leeta met Sildur."));
        assert!(requests[0].prompt.contains("Lita met Sildar."));
    }

    #[tokio::test]
    async fn test_empty_ai_reply_falls_back_to_storybook() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session_id = create_session(&db, campaign_id, 1).await;
        let ai = CannedGenerator::new(vec![Some("   ")]);

        let outcome = enhance_session(
            &db,
            &ai,
            session_id,
            EnhanceInput {
                recap: Some("notes".to_string()),
                current_storybook: Some("storybook".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.enhanced_recap.as_deref(), Some("storybook"));
    }

    #[tokio::test]
    async fn test_recap_without_storybook_skips_ai() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session_id = create_session(&db, campaign_id, 1).await;
        let ai = CannedGenerator::new(vec![]);

        let outcome = enhance_session(
            &db,
            &ai,
            session_id,
            EnhanceInput {
                recap: Some("Plain recap".to_string()),
                outline: Some("1. Ambush".to_string()),
                current_storybook: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(ai.requests.lock().unwrap().is_empty());
        assert_eq!(outcome.enhanced_recap.as_deref(), Some("Plain recap"));
        assert_eq!(outcome.outline.as_deref(), Some("1. Ambush"));
        assert!(outcome.quotes.is_empty());
    }

    #[tokio::test]
    async fn test_notes_upsert_and_link_entities() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session_id = create_session(&db, campaign_id, 1).await;
        let sildar = create_character(&db, campaign_id, "Sildar").await;
        let ai = CannedGenerator::new(vec![]);

        let outcome = enhance_session(
            &db,
            &ai,
            session_id,
            EnhanceInput {
                notes: Some(NOTES.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.notes.as_deref(), Some(NOTES));
        assert_eq!(outcome.enhanced_recap, None);

        let updated = character::Entity::find_by_id(sildar).one(&db).await.unwrap().unwrap();
        assert_eq!(updated.kind.as_deref(), Some("NPC"));
        assert_eq!(updated.description.as_deref(), Some("A knight of the Lords' Alliance"));
        let lita = character::Entity::find()
            .filter(character::Column::Name.eq("Lita"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lita.kind.as_deref(), Some("PC"));

        let links = entities_of_session(&db, session_id).await.unwrap();
        assert_eq!(links[&EntityKind::Character].len(), 2);
        assert_eq!(links[&EntityKind::Item].len(), 1);
        assert!(!links.contains_key(&EntityKind::Lore));
    }

    #[tokio::test]
    async fn test_quest_only_notes_touch_no_entries() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session_id = create_session(&db, campaign_id, 1).await;
        let ai = CannedGenerator::new(vec![]);
        let notes = "QUESTS:\n- Find Gundren: He was taken\n";

        let outcome = enhance_session(
            &db,
            &ai,
            session_id,
            EnhanceInput {
                notes: Some(notes.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.notes.as_deref(), Some(notes));
        assert!(character::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(entities_of_session(&db, session_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_session() {
        let db = setup_test_database().await;
        let ai = CannedGenerator::new(vec![]);
        let err = enhance_session(&db, &ai, 42, EnhanceInput::default()).await.unwrap_err();
        assert_matches!(err.downcast_ref::<InnerApiError>(), Some(InnerApiError::NotFound(_)));
    }
}
