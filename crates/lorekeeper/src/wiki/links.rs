use std::collections::HashMap;

use anyhow::Result;
use lorekeeper_entity::{organization_member, session_entity, EntityKind};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

/// Links `entity_ids` of `kind` to a session; links that already exist are kept as is.
pub async fn link_session<C: ConnectionTrait>(
    conn: &C,
    session_id: i32,
    kind: EntityKind,
    entity_ids: impl IntoIterator<Item = i32>,
) -> Result<()> {
    let models: Vec<_> = entity_ids
        .into_iter()
        .map(|entity_id| session_entity::ActiveModel {
            session_id: Set(session_id),
            kind: Set(kind),
            entity_id: Set(entity_id),
            ..Default::default()
        })
        .collect();
    if models.is_empty() {
        return Ok(());
    }
    session_entity::Entity::insert_many(models)
        .on_conflict(
            OnConflict::columns([
                session_entity::Column::SessionId,
                session_entity::Column::Kind,
                session_entity::Column::EntityId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Sessions the entry appears in.
pub async fn sessions_of_entity<C: ConnectionTrait>(conn: &C, kind: EntityKind, entity_id: i32) -> Result<Vec<i32>> {
    Ok(session_entity::Entity::find()
        .select_only()
        .column(session_entity::Column::SessionId)
        .filter(session_entity::Column::Kind.eq(kind))
        .filter(session_entity::Column::EntityId.eq(entity_id))
        .order_by_asc(session_entity::Column::SessionId)
        .into_tuple::<i32>()
        .all(conn)
        .await?)
}

/// Entries linked to a session, grouped by kind.
pub async fn entities_of_session<C: ConnectionTrait>(conn: &C, session_id: i32) -> Result<HashMap<EntityKind, Vec<i32>>> {
    let rows = session_entity::Entity::find()
        .filter(session_entity::Column::SessionId.eq(session_id))
        .order_by_asc(session_entity::Column::Id)
        .all(conn)
        .await?;
    let mut grouped: HashMap<EntityKind, Vec<i32>> = HashMap::new();
    for row in rows {
        grouped.entry(row.kind).or_default().push(row.entity_id);
    }
    Ok(grouped)
}

pub async fn unlink_entity<C: ConnectionTrait>(conn: &C, kind: EntityKind, entity_id: i32) -> Result<u64> {
    Ok(session_entity::Entity::delete_many()
        .filter(session_entity::Column::Kind.eq(kind))
        .filter(session_entity::Column::EntityId.eq(entity_id))
        .exec(conn)
        .await?
        .rows_affected)
}

/// Adds membership rows, ignoring ones that already exist.
pub async fn add_members<C: ConnectionTrait>(conn: &C, pairs: impl IntoIterator<Item = (i32, i32)>) -> Result<()> {
    let models: Vec<_> = pairs
        .into_iter()
        .map(|(organization_id, character_id)| organization_member::ActiveModel {
            organization_id: Set(organization_id),
            character_id: Set(character_id),
        })
        .collect();
    if models.is_empty() {
        return Ok(());
    }
    organization_member::Entity::insert_many(models)
        .on_conflict(
            OnConflict::columns([
                organization_member::Column::OrganizationId,
                organization_member::Column::CharacterId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Organizations the character is a member of.
pub async fn organizations_of_member<C: ConnectionTrait>(conn: &C, character_id: i32) -> Result<Vec<i32>> {
    Ok(organization_member::Entity::find()
        .select_only()
        .column(organization_member::Column::OrganizationId)
        .filter(organization_member::Column::CharacterId.eq(character_id))
        .into_tuple::<i32>()
        .all(conn)
        .await?)
}

pub async fn members_of_organization<C: ConnectionTrait>(conn: &C, organization_id: i32) -> Result<Vec<i32>> {
    Ok(organization_member::Entity::find()
        .select_only()
        .column(organization_member::Column::CharacterId)
        .filter(organization_member::Column::OrganizationId.eq(organization_id))
        .into_tuple::<i32>()
        .all(conn)
        .await?)
}
