use anyhow::Result;
use lorekeeper_entity::{character, item, location, lore, organization, EntityKind};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use utoipa::ToSchema;

/// Columns every wiki table shares, so one generic code path serves all five kinds.
pub trait WikiEntity: EntityTrait {
    const KIND: EntityKind;

    fn id_column() -> Self::Column;
    fn campaign_column() -> Self::Column;
    /// `name`, or `title` for lore
    fn label_column() -> Self::Column;
    fn description_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
}

macro_rules! impl_wiki_entity {
    ($module:ident, $kind:ident, $label:ident) => {
        impl WikiEntity for $module::Entity {
            const KIND: EntityKind = EntityKind::$kind;

            fn id_column() -> Self::Column {
                $module::Column::Id
            }
            fn campaign_column() -> Self::Column {
                $module::Column::CampaignId
            }
            fn label_column() -> Self::Column {
                $module::Column::$label
            }
            fn description_column() -> Self::Column {
                $module::Column::Description
            }
            fn updated_at_column() -> Self::Column {
                $module::Column::UpdatedAt
            }
        }
    };
}

impl_wiki_entity!(character, Character, Name);
impl_wiki_entity!(location, Location, Name);
impl_wiki_entity!(organization, Organization, Name);
impl_wiki_entity!(item, Item, Name);
impl_wiki_entity!(lore, Lore, Title);

/// Runs `$body` with `$entity` bound to the sea-orm entity type for `$kind`.
macro_rules! with_wiki_entity {
    ($kind:expr, $entity:ident => $body:expr) => {
        match $kind {
            ::lorekeeper_entity::EntityKind::Character => {
                type $entity = lorekeeper_entity::character::Entity;
                $body
            }
            ::lorekeeper_entity::EntityKind::Location => {
                type $entity = lorekeeper_entity::location::Entity;
                $body
            }
            ::lorekeeper_entity::EntityKind::Organization => {
                type $entity = lorekeeper_entity::organization::Entity;
                $body
            }
            ::lorekeeper_entity::EntityKind::Item => {
                type $entity = lorekeeper_entity::item::Entity;
                $body
            }
            ::lorekeeper_entity::EntityKind::Lore => {
                type $entity = lorekeeper_entity::lore::Entity;
                $body
            }
        }
    };
}
pub(crate) use with_wiki_entity;

/// `{ id, name }` pair used by pickers and session detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NameRef {
    pub id: i32,
    pub name: String,
}

impl From<(i32, String)> for NameRef {
    fn from((id, name): (i32, String)) -> Self {
        Self { id, name }
    }
}

pub async fn find_id_by_label<E: WikiEntity, C: ConnectionTrait>(
    conn: &C,
    campaign_id: i32,
    label: &str,
) -> Result<Option<i32>> {
    Ok(E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::campaign_column().eq(campaign_id))
        .filter(E::label_column().eq(label))
        .into_tuple::<i32>()
        .one(conn)
        .await?)
}

/// Id of the `kind` entry called `label` in the campaign.
pub async fn resolve_entity_id<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    campaign_id: i32,
    label: &str,
) -> Result<Option<i32>> {
    with_wiki_entity!(kind, E => find_id_by_label::<E, C>(conn, campaign_id, label).await)
}

/// Every name (title for lore) of `kind` in the campaign, ascending.
pub async fn entity_labels<C: ConnectionTrait>(conn: &C, kind: EntityKind, campaign_id: i32) -> Result<Vec<String>> {
    with_wiki_entity!(kind, E => Ok(E::find()
        .select_only()
        .column(E::label_column())
        .filter(E::campaign_column().eq(campaign_id))
        .order_by_asc(E::label_column())
        .into_tuple::<String>()
        .all(conn)
        .await?))
}

pub async fn name_refs<E: WikiEntity, C: ConnectionTrait>(
    conn: &C,
    condition: sea_orm::Condition,
) -> Result<Vec<NameRef>> {
    Ok(E::find()
        .select_only()
        .column(E::id_column())
        .column(E::label_column())
        .filter(condition)
        .order_by_asc(E::label_column())
        .into_tuple::<(i32, String)>()
        .all(conn)
        .await?
        .into_iter()
        .map(NameRef::from)
        .collect())
}

/// `{ id, name }` of the given rows of `kind`, ordered by name.
pub async fn name_refs_by_ids<C: ConnectionTrait>(conn: &C, kind: EntityKind, ids: Vec<i32>) -> Result<Vec<NameRef>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    with_wiki_entity!(kind, E => name_refs::<E, C>(
        conn,
        sea_orm::Condition::all().add(E::id_column().is_in(ids)),
    ).await)
}

/// Whether row `id` of `kind` exists and belongs to the campaign.
pub async fn entity_in_campaign<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    campaign_id: i32,
    id: i32,
) -> Result<bool> {
    with_wiki_entity!(kind, E => Ok(E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::id_column().eq(id))
        .filter(E::campaign_column().eq(campaign_id))
        .into_tuple::<i32>()
        .one(conn)
        .await?
        .is_some()))
}

pub async fn delete_entity<C: ConnectionTrait>(conn: &C, kind: EntityKind, id: i32) -> Result<u64> {
    with_wiki_entity!(kind, E => Ok(E::delete_many()
        .filter(E::id_column().eq(id))
        .exec(conn)
        .await?
        .rows_affected))
}

/// Sets `updated_at` on a single row.
pub async fn touch_entity<C: ConnectionTrait>(conn: &C, kind: EntityKind, id: i32, now: &str) -> Result<()> {
    with_wiki_entity!(kind, E => {
        E::update_many()
            .col_expr(E::updated_at_column(), Expr::value(now))
            .filter(E::id_column().eq(id))
            .exec(conn)
            .await?;
        Ok(())
    })
}
