//! Create-or-update of wiki entries keyed by (name, campaign).

use anyhow::Result;
use lorekeeper_entity::{character, item, location, lore, organization};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, Set, Unchanged,
};
use tracing::warn;

use crate::utils::time_format::now_standard_string;
use crate::wiki::kind::{find_id_by_label, WikiEntity};

#[derive(Debug, Clone, Default)]
pub struct CharacterFields {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub species: Option<String>,
    pub class_name: Option<String>,
    pub level: Option<i32>,
    pub hp: Option<i32>,
    pub ac: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationFields {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub founding_year: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationFields {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemFields {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoreFields {
    pub title: String,
    pub kind: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
}

/// Field set that can be upserted into one wiki table.
pub trait UpsertFields {
    type Entity: WikiEntity;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;

    /// Used in log lines.
    const WHAT: &'static str;

    fn label(&self) -> &str;
    /// Changes for an existing row. Only supplied columns are set.
    fn changes(self, id: i32) -> Self::ActiveModel;
    fn new_row(self, campaign_id: i32, label: String) -> Self::ActiveModel;
    fn row_id(model: &<Self::Entity as EntityTrait>::Model) -> i32;
}

fn clean_label(label: &str, what: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        warn!("skipping {} with a blank name", what);
        return None;
    }
    Some(label.to_string())
}

/// Overwrites the column only when a value was supplied.
fn set_if_some<T>(field: &mut ActiveValue<Option<T>>, value: Option<T>)
where
    Option<T>: Into<sea_orm::Value>,
{
    if value.is_some() {
        *field = Set(value);
    }
}

/// Returns the row id, or `None` when the name is blank.
pub async fn upsert<F, C>(conn: &C, campaign_id: i32, fields: F) -> Result<Option<i32>>
where
    F: UpsertFields,
    C: ConnectionTrait,
    <F::Entity as EntityTrait>::Model: IntoActiveModel<F::ActiveModel>,
{
    let Some(label) = clean_label(fields.label(), F::WHAT) else {
        return Ok(None);
    };
    let id = match find_id_by_label::<F::Entity, C>(conn, campaign_id, &label).await? {
        Some(id) => {
            fields.changes(id).update(conn).await?;
            id
        }
        None => F::row_id(&fields.new_row(campaign_id, label).insert(conn).await?),
    };
    Ok(Some(id))
}

impl UpsertFields for CharacterFields {
    type Entity = character::Entity;
    type ActiveModel = character::ActiveModel;
    const WHAT: &'static str = "character";

    fn label(&self) -> &str {
        &self.name
    }

    fn changes(self, id: i32) -> character::ActiveModel {
        let mut active = character::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(now_standard_string()),
            ..Default::default()
        };
        set_if_some(&mut active.description, self.description);
        set_if_some(&mut active.kind, self.kind);
        set_if_some(&mut active.species, self.species);
        set_if_some(&mut active.class_name, self.class_name);
        set_if_some(&mut active.level, self.level);
        set_if_some(&mut active.hp, self.hp);
        set_if_some(&mut active.ac, self.ac);
        set_if_some(&mut active.status, self.status);
        active
    }

    fn new_row(self, campaign_id: i32, label: String) -> character::ActiveModel {
        let now = now_standard_string();
        character::ActiveModel {
            campaign_id: Set(campaign_id),
            name: Set(label),
            kind: Set(self.kind),
            description: Set(self.description),
            species: Set(self.species),
            class_name: Set(self.class_name),
            level: Set(self.level),
            hp: Set(self.hp),
            ac: Set(self.ac),
            status: Set(self.status),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn row_id(model: &character::Model) -> i32 {
        model.id
    }
}

impl UpsertFields for LocationFields {
    type Entity = location::Entity;
    type ActiveModel = location::ActiveModel;
    const WHAT: &'static str = "location";

    fn label(&self) -> &str {
        &self.name
    }

    fn changes(self, id: i32) -> location::ActiveModel {
        let mut active = location::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(now_standard_string()),
            ..Default::default()
        };
        set_if_some(&mut active.description, self.description);
        set_if_some(&mut active.kind, self.kind);
        set_if_some(&mut active.founding_year, self.founding_year);
        active
    }

    fn new_row(self, campaign_id: i32, label: String) -> location::ActiveModel {
        let now = now_standard_string();
        location::ActiveModel {
            campaign_id: Set(campaign_id),
            name: Set(label),
            kind: Set(self.kind),
            description: Set(self.description),
            founding_year: Set(self.founding_year),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn row_id(model: &location::Model) -> i32 {
        model.id
    }
}

impl UpsertFields for OrganizationFields {
    type Entity = organization::Entity;
    type ActiveModel = organization::ActiveModel;
    const WHAT: &'static str = "organization";

    fn label(&self) -> &str {
        &self.name
    }

    fn changes(self, id: i32) -> organization::ActiveModel {
        let mut active = organization::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(now_standard_string()),
            ..Default::default()
        };
        set_if_some(&mut active.description, self.description);
        set_if_some(&mut active.kind, self.kind);
        active
    }

    fn new_row(self, campaign_id: i32, label: String) -> organization::ActiveModel {
        let now = now_standard_string();
        organization::ActiveModel {
            campaign_id: Set(campaign_id),
            name: Set(label),
            kind: Set(self.kind),
            description: Set(self.description),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn row_id(model: &organization::Model) -> i32 {
        model.id
    }
}

impl UpsertFields for ItemFields {
    type Entity = item::Entity;
    type ActiveModel = item::ActiveModel;
    const WHAT: &'static str = "item";

    fn label(&self) -> &str {
        &self.name
    }

    fn changes(self, id: i32) -> item::ActiveModel {
        let mut active = item::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(now_standard_string()),
            ..Default::default()
        };
        set_if_some(&mut active.description, self.description);
        set_if_some(&mut active.kind, self.kind);
        set_if_some(&mut active.rarity, self.rarity);
        active
    }

    fn new_row(self, campaign_id: i32, label: String) -> item::ActiveModel {
        let now = now_standard_string();
        item::ActiveModel {
            campaign_id: Set(campaign_id),
            name: Set(label),
            kind: Set(self.kind),
            description: Set(self.description),
            rarity: Set(self.rarity),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn row_id(model: &item::Model) -> i32 {
        model.id
    }
}

impl UpsertFields for LoreFields {
    type Entity = lore::Entity;
    type ActiveModel = lore::ActiveModel;
    const WHAT: &'static str = "lore entry";

    fn label(&self) -> &str {
        &self.title
    }

    fn changes(self, id: i32) -> lore::ActiveModel {
        let mut active = lore::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(now_standard_string()),
            ..Default::default()
        };
        set_if_some(&mut active.description, self.description);
        set_if_some(&mut active.kind, self.kind);
        set_if_some(&mut active.tag, self.tag);
        active
    }

    fn new_row(self, campaign_id: i32, label: String) -> lore::ActiveModel {
        let now = now_standard_string();
        lore::ActiveModel {
            campaign_id: Set(campaign_id),
            title: Set(label),
            kind: Set(self.kind),
            tag: Set(self.tag),
            description: Set(self.description),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn row_id(model: &lore::Model) -> i32 {
        model.id
    }
}
