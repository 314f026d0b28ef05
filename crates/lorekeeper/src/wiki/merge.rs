use anyhow::Result;
use lorekeeper_entity::{character, organization, organization_member, EntityKind};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::InnerApiError;
use crate::database::begin_write_transaction;
use crate::utils::time_format::now_standard_string;
use crate::wiki::kind::{delete_entity, resolve_entity_id, touch_entity};
use crate::wiki::links::{
    add_members, link_session, members_of_organization, organizations_of_member, sessions_of_entity, unlink_entity,
};
use crate::wiki::find_campaign;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub kind: EntityKind,
    pub source_id: i32,
    pub target_id: i32,
    /// sessions that gained a link to the target
    pub sessions_relinked: u64,
    /// memberships and foreign keys moved to the target
    pub relations_repointed: u64,
}

/// Folds the `source` entry into `target` and deletes `source`.
///
/// Every session link, membership and foreign key naming the source is moved
/// to the target inside one write transaction; on any error nothing changes.
pub async fn merge_entities(
    db: &DatabaseConnection,
    campaign_id: i32,
    kind: EntityKind,
    source_name: &str,
    target_name: &str,
) -> Result<MergeOutcome> {
    if source_name == target_name {
        return Err(InnerApiError::BadRequest("Source and target must be different entries".to_string()).into());
    }

    let txn = begin_write_transaction(db).await?;
    find_campaign(&txn, campaign_id).await?;

    let source_id = resolve_entity_id(&txn, kind, campaign_id, source_name)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("Source \"{}\" not found.", source_name)))?;
    let target_id = resolve_entity_id(&txn, kind, campaign_id, target_name)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("Target \"{}\" not found.", target_name)))?;
    if source_id == target_id {
        return Err(InnerApiError::BadRequest("Source and target must be different entries".to_string()).into());
    }

    let sessions = sessions_of_entity(&txn, kind, source_id).await?;
    let sessions_relinked = sessions.len() as u64;
    for session_id in sessions {
        link_session(&txn, session_id, kind, [target_id]).await?;
    }

    let relations_repointed = match kind {
        EntityKind::Character => repoint_character(&txn, source_id, target_id).await?,
        EntityKind::Location => repoint_location(&txn, source_id, target_id).await?,
        EntityKind::Organization => repoint_organization(&txn, source_id, target_id).await?,
        EntityKind::Item | EntityKind::Lore => 0,
    };

    // the source's own link rows go first, then the row itself
    unlink_entity(&txn, kind, source_id).await?;
    match kind {
        EntityKind::Character => {
            organization_member::Entity::delete_many()
                .filter(organization_member::Column::CharacterId.eq(source_id))
                .exec(&txn)
                .await?;
        }
        EntityKind::Organization => {
            organization_member::Entity::delete_many()
                .filter(organization_member::Column::OrganizationId.eq(source_id))
                .exec(&txn)
                .await?;
        }
        _ => {}
    }
    delete_entity(&txn, kind, source_id).await?;
    touch_entity(&txn, kind, target_id, &now_standard_string()).await?;

    txn.commit().await?;
    info!(
        "merged {} \"{}\" into \"{}\": {} sessions relinked, {} relations repointed",
        kind, source_name, target_name, sessions_relinked, relations_repointed
    );
    Ok(MergeOutcome {
        kind,
        source_id,
        target_id,
        sessions_relinked,
        relations_repointed,
    })
}

async fn repoint_character<C: ConnectionTrait>(conn: &C, source_id: i32, target_id: i32) -> Result<u64> {
    let organizations = organizations_of_member(conn, source_id).await?;
    let mut repointed = organizations.len() as u64;
    add_members(conn, organizations.into_iter().map(|org| (org, target_id))).await?;

    repointed += organization::Entity::update_many()
        .col_expr(organization::Column::LeaderId, Expr::value(target_id))
        .filter(organization::Column::LeaderId.eq(source_id))
        .exec(conn)
        .await?
        .rows_affected;
    Ok(repointed)
}

async fn repoint_location<C: ConnectionTrait>(conn: &C, source_id: i32, target_id: i32) -> Result<u64> {
    let origins = character::Entity::update_many()
        .col_expr(character::Column::OriginId, Expr::value(target_id))
        .filter(character::Column::OriginId.eq(source_id))
        .exec(conn)
        .await?
        .rows_affected;
    let headquarters = organization::Entity::update_many()
        .col_expr(organization::Column::HeadquartersId, Expr::value(target_id))
        .filter(organization::Column::HeadquartersId.eq(source_id))
        .exec(conn)
        .await?
        .rows_affected;
    Ok(origins + headquarters)
}

async fn repoint_organization<C: ConnectionTrait>(conn: &C, source_id: i32, target_id: i32) -> Result<u64> {
    let members = members_of_organization(conn, source_id).await?;
    let repointed = members.len() as u64;
    add_members(conn, members.into_iter().map(|member| (target_id, member))).await?;
    Ok(repointed)
}
