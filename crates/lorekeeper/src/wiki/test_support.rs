//! Row builders shared by the database tests.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use lorekeeper_entity::{campaign, character, item, location, lore, organization, session_summary};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::ai::{GenerationRequest, TextGenerator};

const NOW: &str = "2025-10-16 12:00:00";

pub async fn create_campaign(db: &DatabaseConnection, name: &str) -> i32 {
    campaign::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_character(db: &DatabaseConnection, campaign_id: i32, name: &str) -> i32 {
    character::ActiveModel {
        campaign_id: Set(campaign_id),
        name: Set(name.to_string()),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_location(db: &DatabaseConnection, campaign_id: i32, name: &str) -> i32 {
    location::ActiveModel {
        campaign_id: Set(campaign_id),
        name: Set(name.to_string()),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_organization(db: &DatabaseConnection, campaign_id: i32, name: &str) -> i32 {
    organization::ActiveModel {
        campaign_id: Set(campaign_id),
        name: Set(name.to_string()),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_item(db: &DatabaseConnection, campaign_id: i32, name: &str) -> i32 {
    item::ActiveModel {
        campaign_id: Set(campaign_id),
        name: Set(name.to_string()),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_lore(db: &DatabaseConnection, campaign_id: i32, title: &str) -> i32 {
    lore::ActiveModel {
        campaign_id: Set(campaign_id),
        title: Set(title.to_string()),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_session(db: &DatabaseConnection, campaign_id: i32, number: i32) -> i32 {
    session_summary::ActiveModel {
        campaign_id: Set(campaign_id),
        session_number: Set(number),
        title: Set(format!("Session {}", number)),
        created_at: Set(NOW.to_string()),
        updated_at: Set(NOW.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn set_leader(db: &DatabaseConnection, organization_id: i32, character_id: i32) {
    let mut active: organization::ActiveModel = organization::Entity::find_by_id(organization_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.leader_id = Set(Some(character_id));
    active.update(db).await.unwrap();
}

pub async fn set_description(db: &DatabaseConnection, character_id: i32, description: &str) {
    let mut active: character::ActiveModel = character::Entity::find_by_id(character_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.description = Set(Some(description.to_string()));
    active.update(db).await.unwrap();
}

/// Replays canned replies in order and records the requests it saw.
pub struct CannedGenerator {
    replies: Mutex<Vec<Option<String>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl CannedGenerator {
    pub fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().map(|r| r.map(str::to_string)).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>> {
        self.requests.lock().unwrap().push(request);
        Ok(self.replies.lock().unwrap().pop().flatten())
    }
}
