pub mod enhance;
pub mod ingest;
pub mod kind;
pub mod links;
pub mod merge;
pub mod notes_parser;
pub mod quotes;
pub mod replace;
pub mod upsert;

#[cfg(test)]
pub mod test_support;

use anyhow::Result;
use lorekeeper_entity::campaign;
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::api::error::InnerApiError;

pub async fn find_campaign<C: ConnectionTrait>(conn: &C, campaign_id: i32) -> Result<campaign::Model> {
    campaign::Entity::find_by_id(campaign_id)
        .one(conn)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("Campaign {} not found", campaign_id)).into())
}
