use anyhow::Result;
use lorekeeper_entity::{character, item, location, lore, organization, session_summary};
use sea_orm::sea_query::{Alias, Condition, Expr, Func, SimpleExpr};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, Unchanged};
use tracing::{debug, info, warn};

use crate::api::error::InnerApiError;
use crate::database::begin_write_transaction;
use crate::utils::time_format::now_standard_string;
use crate::wiki::find_campaign;
use crate::wiki::kind::WikiEntity;

/// `REPLACE(col, find, replace)`
fn replace_expr<C: ColumnTrait>(column: C, find: &str, replace: &str) -> SimpleExpr {
    Func::cust(Alias::new("REPLACE"))
        .arg(Expr::col(column))
        .arg(Expr::val(find))
        .arg(Expr::val(replace))
        .into()
}

/// Case-sensitive containment; `LIKE` would fold ASCII case on SQLite.
fn contains_expr<C: ColumnTrait>(column: C, find: &str) -> SimpleExpr {
    Expr::expr(Func::cust(Alias::new("instr")).arg(Expr::col(column)).arg(Expr::val(find))).gt(0)
}

/// Exact-match rename of the label column.
async fn replace_labels<E: WikiEntity, C: ConnectionTrait>(
    conn: &C,
    campaign_id: i32,
    find: &str,
    replace: &str,
    now: &str,
) -> Result<u64> {
    let affected = E::update_many()
        .col_expr(E::label_column(), Expr::value(replace))
        .col_expr(E::updated_at_column(), Expr::value(now))
        .filter(E::campaign_column().eq(campaign_id))
        .filter(E::label_column().eq(find))
        .exec(conn)
        .await?
        .rows_affected;
    debug!("{} {} labels replaced", affected, E::KIND);
    Ok(affected)
}

async fn replace_descriptions<E: WikiEntity, C: ConnectionTrait>(
    conn: &C,
    campaign_id: i32,
    find: &str,
    replace: &str,
    now: &str,
) -> Result<u64> {
    let affected = E::update_many()
        .col_expr(E::description_column(), replace_expr(E::description_column(), find, replace))
        .col_expr(E::updated_at_column(), Expr::value(now))
        .filter(E::campaign_column().eq(campaign_id))
        .filter(contains_expr(E::description_column(), find))
        .exec(conn)
        .await?
        .rows_affected;
    debug!("{} {} descriptions replaced", affected, E::KIND);
    Ok(affected)
}

async fn replace_session_text<C: ConnectionTrait>(
    conn: &C,
    campaign_id: i32,
    find: &str,
    replace: &str,
    now: &str,
) -> Result<u64> {
    use session_summary::Column;

    Ok(session_summary::Entity::update_many()
        .col_expr(Column::Recap, replace_expr(Column::Recap, find, replace))
        .col_expr(Column::Outline, replace_expr(Column::Outline, find, replace))
        .col_expr(Column::Notes, replace_expr(Column::Notes, find, replace))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::CampaignId.eq(campaign_id))
        .filter(
            Condition::any()
                .add(contains_expr(Column::Recap, find))
                .add(contains_expr(Column::Outline, find))
                .add(contains_expr(Column::Notes, find)),
        )
        .exec(conn)
        .await?
        .rows_affected)
}

/// Rewrites the quotes JSON as text; each changed session counts once.
async fn replace_session_quotes<C: ConnectionTrait>(
    conn: &C,
    campaign_id: i32,
    find: &str,
    replace: &str,
    now: &str,
) -> Result<u64> {
    let sessions = session_summary::Entity::find()
        .filter(session_summary::Column::CampaignId.eq(campaign_id))
        .filter(session_summary::Column::NotableQuotes.is_not_null())
        .all(conn)
        .await?;

    let mut updated = 0;
    for session in sessions {
        let Some(quotes) = session.notable_quotes else {
            continue;
        };
        let encoded = serde_json::to_string(&quotes)?;
        if !encoded.contains(find) {
            continue;
        }
        let replaced = match serde_json::from_str::<serde_json::Value>(&encoded.replace(find, replace)) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "quotes of session {} are no longer valid JSON after replacement, left unchanged: {}",
                    session.id, e
                );
                continue;
            }
        };
        session_summary::ActiveModel {
            id: Unchanged(session.id),
            notable_quotes: Set(Some(replaced)),
            updated_at: Set(now.to_string()),
            ..Default::default()
        }
        .update(conn)
        .await?;
        updated += 1;
    }
    Ok(updated)
}

/// Replaces `find` with `replace` across one campaign.
///
/// Names and titles change only on an exact match; descriptions, session
/// text and quotes get every case-sensitive occurrence replaced. Returns the
/// number of rows touched.
pub async fn replace_in_campaign(db: &DatabaseConnection, campaign_id: i32, find: &str, replace: &str) -> Result<u64> {
    if find.is_empty() || replace.is_empty() {
        return Err(InnerApiError::BadRequest("Both \"find\" and \"replace\" fields are required".to_string()).into());
    }

    let txn = begin_write_transaction(db).await?;
    find_campaign(&txn, campaign_id).await?;
    let now = now_standard_string();

    let mut count = 0;
    count += replace_labels::<character::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_labels::<location::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_labels::<organization::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_labels::<item::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_labels::<lore::Entity, _>(&txn, campaign_id, find, replace, &now).await?;

    count += replace_descriptions::<character::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_descriptions::<location::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_descriptions::<organization::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_descriptions::<item::Entity, _>(&txn, campaign_id, find, replace, &now).await?;
    count += replace_descriptions::<lore::Entity, _>(&txn, campaign_id, find, replace, &now).await?;

    count += replace_session_text(&txn, campaign_id, find, replace, &now).await?;
    count += replace_session_quotes(&txn, campaign_id, find, replace, &now).await?;

    txn.commit().await?;
    info!(
        "replaced \"{}\" with \"{}\" in campaign {}: {} rows updated",
        find, replace, campaign_id, count
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup_test_database;
    use crate::wiki::test_support::*;
    use assert_matches::assert_matches;
    use sea_orm::DbErr;
    use serde_json::json;

    async fn character_row(db: &DatabaseConnection, id: i32) -> character::Model {
        character::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
    }

    async fn set_session_text(db: &DatabaseConnection, id: i32, recap: &str, quotes: serde_json::Value) {
        session_summary::ActiveModel {
            id: Unchanged(id),
            recap: Set(Some(recap.to_string())),
            notable_quotes: Set(Some(quotes)),
            ..Default::default()
        }
        .update(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_replace_across_campaign() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let other_campaign = create_campaign(&db, "Strahd").await;

        let lita = create_character(&db, campaign_id, "Lita").await;
        let sildar = create_character(&db, campaign_id, "Sildar").await;
        set_description(&db, sildar, "Rescued by Lita. Lita is brave; lita is lowercase.").await;
        let other_lita = create_character(&db, other_campaign, "Lita").await;
        set_description(&db, other_lita, "Lita in another campaign").await;
        let unrelated = create_character(&db, campaign_id, "Lita's Cousin").await;

        let session = create_session(&db, campaign_id, 1).await;
        set_session_text(
            &db,
            session,
            "Lita opened the door.",
            json!([{"quote": "Run!", "speaker": "Lita"}, {"quote": "Lita, wait", "speaker": "Sildar"}]),
        )
        .await;
        let quiet_session = create_session(&db, campaign_id, 2).await;
        set_session_text(&db, quiet_session, "Nothing happened.", json!(["Hello"])).await;

        let count = replace_in_campaign(&db, campaign_id, "Lita", "Lidda").await.unwrap();
        // one name, one description, session text, session quotes
        assert_eq!(count, 4);

        assert_eq!(character_row(&db, lita).await.name, "Lidda");
        assert_eq!(
            character_row(&db, sildar).await.description.as_deref(),
            Some("Rescued by Lidda. Lidda is brave; lita is lowercase.")
        );
        // only exact names are renamed
        assert_eq!(character_row(&db, unrelated).await.name, "Lita's Cousin");
        // other campaigns are untouched
        let other = character_row(&db, other_lita).await;
        assert_eq!(other.name, "Lita");
        assert_eq!(other.description.as_deref(), Some("Lita in another campaign"));

        let row = session_summary::Entity::find_by_id(session).one(&db).await.unwrap().unwrap();
        assert_eq!(row.recap.as_deref(), Some("Lidda opened the door."));
        assert_eq!(
            row.notable_quotes,
            Some(json!([{"quote": "Run!", "speaker": "Lidda"}, {"quote": "Lidda, wait", "speaker": "Sildar"}]))
        );
    }

    #[tokio::test]
    async fn test_overlapping_pairs_are_not_idempotent() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let id = create_character(&db, campaign_id, "Guide").await;
        set_description(&db, id, "Lita").await;

        replace_in_campaign(&db, campaign_id, "Lita", "Lidda").await.unwrap();
        replace_in_campaign(&db, campaign_id, "Lid", "Lida").await.unwrap();
        assert_eq!(character_row(&db, id).await.description.as_deref(), Some("Lidada"));

        // a second identical run finds nothing left to change
        assert_eq!(replace_in_campaign(&db, campaign_id, "Lita", "Lidda").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_after_replace_is_skipped() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let session = create_session(&db, campaign_id, 1).await;
        set_session_text(&db, session, "", json!([{"quote": "Hi"}])).await;

        // replacing the closing bracket breaks the document
        let count = replace_in_campaign(&db, campaign_id, "}]", "oops").await.unwrap();
        assert_eq!(count, 0);
        let row = session_summary::Entity::find_by_id(session).one(&db).await.unwrap().unwrap();
        assert_eq!(row.notable_quotes, Some(json!([{"quote": "Hi"}])));
    }

    #[tokio::test]
    async fn test_name_collision_rolls_back() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let lita = create_character(&db, campaign_id, "Lita").await;
        create_character(&db, campaign_id, "Lidda").await;
        let witness = create_character(&db, campaign_id, "Witness").await;
        set_description(&db, witness, "Saw Lita").await;

        let err = replace_in_campaign(&db, campaign_id, "Lita", "Lidda").await.unwrap_err();
        let db_err = err.downcast_ref::<DbErr>().unwrap();
        assert_matches!(db_err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)));

        assert_eq!(character_row(&db, lita).await.name, "Lita");
        assert_eq!(character_row(&db, witness).await.description.as_deref(), Some("Saw Lita"));
    }

    #[tokio::test]
    async fn test_validation() {
        let db = setup_test_database().await;
        let campaign_id = create_campaign(&db, "Lost Mine").await;
        let err = replace_in_campaign(&db, campaign_id, "", "x").await.unwrap_err();
        assert_matches!(err.downcast_ref::<InnerApiError>(), Some(InnerApiError::BadRequest(_)));
        let err = replace_in_campaign(&db, 404, "a", "b").await.unwrap_err();
        assert_matches!(err.downcast_ref::<InnerApiError>(), Some(InnerApiError::NotFound(_)));
    }
}
