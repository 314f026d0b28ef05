use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Extension, Path, Query};
use axum::Json;
use lorekeeper_entity::{
    campaign, character, item, location, lore, organization, organization_member, session_summary, EntityKind,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use utoipa::OpenApi;

use crate::ai::TextGenerator;
use crate::api::error::InnerApiError;
use crate::api::request::{
    EnhanceRequest, EntitiesQuery, GenerateRequest, MergeRequest, ReplaceRequest, UpdateCharacterRequest,
    UpdateItemRequest, UpdateLocationRequest, UpdateLoreRequest, UpdateOrganizationRequest, UpdateSessionRequest,
};
use crate::api::response::{
    CampaignDetail, CampaignLists, CampaignSummary, EnhanceResponse, GenerateResponse, MergeResponse,
    OrganizationDetail, ReplaceResponse, SessionDetail,
};
use crate::api::wrapper::{ApiError, ApiResponse, ErrorBody};
use crate::database::begin_write_transaction;
use crate::utils::time_format::now_standard_string;
use crate::wiki::enhance::{enhance_session, EnhanceInput};
use crate::wiki::find_campaign;
use crate::wiki::ingest::ingest_transcript;
use crate::wiki::kind::{entity_in_campaign, entity_labels, name_refs, name_refs_by_ids, WikiEntity};
use crate::wiki::links::{add_members, entities_of_session, members_of_organization};
use crate::wiki::merge::merge_entities;
use crate::wiki::replace::replace_in_campaign;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_campaigns,
        get_campaign,
        list_campaign_characters,
        list_campaign_locations,
        list_campaign_organizations,
        list_campaign_items,
        list_campaign_lore,
        list_entity_names,
        get_campaign_lists,
        merge_campaign_entities,
        replace_campaign_text,
        generate_session,
        get_character,
        update_character,
        get_location,
        update_location,
        get_item,
        update_item,
        get_lore,
        update_lore,
        get_organization,
        update_organization,
        get_session,
        update_session,
        enhance_session_notes
    ),
    tags((name = "lorekeeper", description = "Campaign wiki API"))
)]
pub struct ApiDoc;

fn parse_kind(raw: Option<&str>) -> Result<EntityKind, InnerApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| InnerApiError::BadRequest("The \"type\" field is required".to_string()))?;
    EntityKind::from_str(raw).map_err(|_| InnerApiError::BadRequest(format!("Invalid type: {}", raw)))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, InnerApiError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| InnerApiError::BadRequest(format!("\"{}\" is required", field)))
}

/// A name or title may be left out of a patch but never blanked.
fn patched_label(value: Option<String>, field: &str) -> Result<Option<String>, InnerApiError> {
    match value {
        None => Ok(None),
        Some(value) => {
            let value = value.trim();
            if value.is_empty() {
                return Err(InnerApiError::BadRequest(format!("{} cannot be empty", field)));
            }
            Ok(Some(value.to_string()))
        }
    }
}

fn patch<T>(field: &mut ActiveValue<T>, value: Option<T>)
where
    T: Into<sea_orm::Value>,
{
    if let Some(value) = value {
        *field = Set(value);
    }
}

async fn find_entry<E: WikiEntity, C: ConnectionTrait>(conn: &C, id: i32) -> Result<E::Model> {
    E::find()
        .filter(E::id_column().eq(id))
        .one(conn)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("{} {} not found", E::KIND, id)).into())
}

async fn find_session<C: ConnectionTrait>(conn: &C, id: i32) -> Result<session_summary::Model> {
    session_summary::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(format!("Session {} not found", id)).into())
}

async fn campaign_entries<E: WikiEntity>(db: &DatabaseConnection, campaign_id: i32) -> Result<Vec<E::Model>> {
    find_campaign(db, campaign_id).await?;
    Ok(E::find()
        .filter(E::campaign_column().eq(campaign_id))
        .order_by_asc(E::label_column())
        .all(db)
        .await?)
}

async fn ensure_in_campaign<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    campaign_id: i32,
    id: i32,
    field: &str,
) -> Result<()> {
    if entity_in_campaign(conn, kind, campaign_id, id).await? {
        return Ok(());
    }
    Err(InnerApiError::BadRequest(format!("{} {} is not a {} of this campaign", field, id, kind)).into())
}

/// Every campaign with its session count, newest first.
#[utoipa::path(
    get,
    path = "/api/campaigns",
    responses(
        (status = 200, body = [CampaignSummary]),
    )
)]
pub async fn list_campaigns(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<CampaignSummary>>, ApiError> {
    let campaigns = campaign::Entity::find()
        .order_by_desc(campaign::Column::CreatedAt)
        .order_by_desc(campaign::Column::Id)
        .all(db.as_ref())
        .await?;
    let counts: HashMap<i32, i64> = session_summary::Entity::find()
        .select_only()
        .column(session_summary::Column::CampaignId)
        .column_as(Expr::col(session_summary::Column::Id).count(), "session_count")
        .group_by(session_summary::Column::CampaignId)
        .into_tuple::<(i32, i64)>()
        .all(db.as_ref())
        .await?
        .into_iter()
        .collect();
    Ok(ApiResponse::ok(
        campaigns
            .into_iter()
            .map(|campaign| CampaignSummary {
                session_count: counts.get(&campaign.id).copied().unwrap_or(0) as u64,
                campaign,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses(
        (status = 200, body = CampaignDetail),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn get_campaign(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<CampaignDetail>, ApiError> {
    let campaign = find_campaign(db.as_ref(), id).await?;
    let sessions = session_summary::Entity::find()
        .filter(session_summary::Column::CampaignId.eq(id))
        .order_by_asc(session_summary::Column::SessionNumber)
        .all(db.as_ref())
        .await?;
    Ok(ApiResponse::ok(CampaignDetail { campaign, sessions }))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/characters",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = [character::Model]), (status = 404, body = ErrorBody))
)]
pub async fn list_campaign_characters(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<character::Model>>, ApiError> {
    Ok(ApiResponse::ok(campaign_entries::<character::Entity>(db.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/locations",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = [location::Model]), (status = 404, body = ErrorBody))
)]
pub async fn list_campaign_locations(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<location::Model>>, ApiError> {
    Ok(ApiResponse::ok(campaign_entries::<location::Entity>(db.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/organizations",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = [organization::Model]), (status = 404, body = ErrorBody))
)]
pub async fn list_campaign_organizations(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<organization::Model>>, ApiError> {
    Ok(ApiResponse::ok(campaign_entries::<organization::Entity>(db.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/items",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = [item::Model]), (status = 404, body = ErrorBody))
)]
pub async fn list_campaign_items(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<item::Model>>, ApiError> {
    Ok(ApiResponse::ok(campaign_entries::<item::Entity>(db.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/lore",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = [lore::Model]), (status = 404, body = ErrorBody))
)]
pub async fn list_campaign_lore(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<lore::Model>>, ApiError> {
    Ok(ApiResponse::ok(campaign_entries::<lore::Entity>(db.as_ref(), id).await?))
}

/// Names (titles for lore) of one kind, for the merge picker.
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/entities",
    params(("id" = i32, Path, description = "Campaign ID"), EntitiesQuery),
    responses(
        (status = 200, body = [String]),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn list_entity_names(
    Path(id): Path<i32>,
    Query(params): Query<EntitiesQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    let kind = parse_kind(params.kind.as_deref())?;
    find_campaign(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(entity_labels(db.as_ref(), kind, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/lists",
    params(("id" = i32, Path, description = "Campaign ID")),
    responses((status = 200, body = CampaignLists), (status = 404, body = ErrorBody))
)]
pub async fn get_campaign_lists(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<CampaignLists>, ApiError> {
    find_campaign(db.as_ref(), id).await?;
    let characters = name_refs::<character::Entity, _>(
        db.as_ref(),
        Condition::all().add(character::Column::CampaignId.eq(id)),
    )
    .await?;
    let locations = name_refs::<location::Entity, _>(
        db.as_ref(),
        Condition::all().add(location::Column::CampaignId.eq(id)),
    )
    .await?;
    Ok(ApiResponse::ok(CampaignLists { characters, locations }))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/merge",
    params(("id" = i32, Path, description = "Campaign ID")),
    request_body = MergeRequest,
    responses(
        (status = 200, body = MergeResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn merge_campaign_entities(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<MergeRequest>,
) -> Result<ApiResponse<MergeResponse>, ApiError> {
    let kind = parse_kind(request.kind.as_deref())?;
    let source_name = required_text(request.source_name, "sourceName")?;
    let target_name = required_text(request.target_name, "targetName")?;
    let outcome = merge_entities(db.as_ref(), id, kind, &source_name, &target_name).await?;
    Ok(ApiResponse::ok(MergeResponse { success: true, outcome }))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/replace",
    params(("id" = i32, Path, description = "Campaign ID")),
    request_body = ReplaceRequest,
    responses(
        (status = 200, body = ReplaceResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn replace_campaign_text(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<ReplaceRequest>,
) -> Result<ApiResponse<ReplaceResponse>, ApiError> {
    let count = replace_in_campaign(
        db.as_ref(),
        id,
        request.find.as_deref().unwrap_or_default(),
        request.replace.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(ApiResponse::ok(ReplaceResponse {
        message: "Replacement complete!".to_string(),
        count,
    }))
}

/// Runs a session transcript through the model and files the results.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, body = GenerateResponse),
        (status = 400, body = ErrorBody),
        (status = 500, body = ErrorBody),
    )
)]
pub async fn generate_session(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(ai): Extension<Arc<dyn TextGenerator>>,
    Json(request): Json<GenerateRequest>,
) -> Result<ApiResponse<GenerateResponse>, ApiError> {
    let outcome = ingest_transcript(
        db.as_ref(),
        ai.as_ref(),
        request.campaign_name.as_deref().unwrap_or_default(),
        request.transcript.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(ApiResponse::ok(GenerateResponse {
        message: "AI processing complete!".to_string(),
        outcome,
    }))
}

#[utoipa::path(
    get,
    path = "/api/characters/{id}",
    params(("id" = i32, Path, description = "Character ID")),
    responses((status = 200, body = character::Model), (status = 404, body = ErrorBody))
)]
pub async fn get_character(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<character::Model>, ApiError> {
    Ok(ApiResponse::ok(find_entry::<character::Entity, _>(db.as_ref(), id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/characters/{id}",
    params(("id" = i32, Path, description = "Character ID")),
    request_body = UpdateCharacterRequest,
    responses(
        (status = 200, body = character::Model),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_character(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateCharacterRequest>,
) -> Result<ApiResponse<character::Model>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let existing = find_entry::<character::Entity, _>(&txn, id).await?;
    if let Some(Some(origin_id)) = request.origin_id {
        ensure_in_campaign(&txn, EntityKind::Location, existing.campaign_id, origin_id, "originId").await?;
    }
    let mut active = existing.into_active_model();
    patch(&mut active.name, patched_label(request.name, "Name")?);
    patch(&mut active.kind, request.kind);
    patch(&mut active.description, request.description);
    patch(&mut active.species, request.species);
    patch(&mut active.class_name, request.class_name);
    patch(&mut active.level, request.level);
    patch(&mut active.hp, request.hp);
    patch(&mut active.ac, request.ac);
    patch(&mut active.status, request.status);
    patch(&mut active.origin_id, request.origin_id);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(updated))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(("id" = i32, Path, description = "Location ID")),
    responses((status = 200, body = location::Model), (status = 404, body = ErrorBody))
)]
pub async fn get_location(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<location::Model>, ApiError> {
    Ok(ApiResponse::ok(find_entry::<location::Entity, _>(db.as_ref(), id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/locations/{id}",
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, body = location::Model),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_location(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<ApiResponse<location::Model>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let mut active = find_entry::<location::Entity, _>(&txn, id).await?.into_active_model();
    patch(&mut active.name, patched_label(request.name, "Name")?);
    patch(&mut active.kind, request.kind);
    patch(&mut active.description, request.description);
    patch(&mut active.founding_year, request.founding_year);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(updated))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    responses((status = 200, body = item::Model), (status = 404, body = ErrorBody))
)]
pub async fn get_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<item::Model>, ApiError> {
    Ok(ApiResponse::ok(find_entry::<item::Entity, _>(db.as_ref(), id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, body = item::Model),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<ApiResponse<item::Model>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let mut active = find_entry::<item::Entity, _>(&txn, id).await?.into_active_model();
    patch(&mut active.name, patched_label(request.name, "Name")?);
    patch(&mut active.kind, request.kind);
    patch(&mut active.description, request.description);
    patch(&mut active.rarity, request.rarity);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(updated))
}

#[utoipa::path(
    get,
    path = "/api/lore/{id}",
    params(("id" = i32, Path, description = "Lore ID")),
    responses((status = 200, body = lore::Model), (status = 404, body = ErrorBody))
)]
pub async fn get_lore(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<lore::Model>, ApiError> {
    Ok(ApiResponse::ok(find_entry::<lore::Entity, _>(db.as_ref(), id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/lore/{id}",
    params(("id" = i32, Path, description = "Lore ID")),
    request_body = UpdateLoreRequest,
    responses(
        (status = 200, body = lore::Model),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_lore(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateLoreRequest>,
) -> Result<ApiResponse<lore::Model>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let mut active = find_entry::<lore::Entity, _>(&txn, id).await?.into_active_model();
    patch(&mut active.title, patched_label(request.title, "Title")?);
    patch(&mut active.kind, request.kind);
    patch(&mut active.tag, request.tag);
    patch(&mut active.description, request.description);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(updated))
}

async fn organization_detail<C: ConnectionTrait>(
    conn: &C,
    organization: organization::Model,
) -> Result<OrganizationDetail> {
    let leader = match organization.leader_id {
        Some(leader_id) => character::Entity::find_by_id(leader_id).one(conn).await?,
        None => None,
    };
    let headquarters = match organization.headquarters_id {
        Some(headquarters_id) => location::Entity::find_by_id(headquarters_id).one(conn).await?,
        None => None,
    };
    let member_ids = members_of_organization(conn, organization.id).await?;
    let members = if member_ids.is_empty() {
        Vec::new()
    } else {
        character::Entity::find()
            .filter(character::Column::Id.is_in(member_ids))
            .order_by_asc(character::Column::Name)
            .all(conn)
            .await?
    };
    Ok(OrganizationDetail {
        organization,
        leader,
        headquarters,
        members,
    })
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(("id" = i32, Path, description = "Organization ID")),
    responses((status = 200, body = OrganizationDetail), (status = 404, body = ErrorBody))
)]
pub async fn get_organization(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<OrganizationDetail>, ApiError> {
    let organization = find_entry::<organization::Entity, _>(db.as_ref(), id).await?;
    Ok(ApiResponse::ok(organization_detail(db.as_ref(), organization).await?))
}

/// Updates an organization together with its leader, headquarters and members.
#[utoipa::path(
    patch,
    path = "/api/organizations/{id}",
    params(("id" = i32, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, body = OrganizationDetail),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_organization(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<ApiResponse<OrganizationDetail>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let existing = find_entry::<organization::Entity, _>(&txn, id).await?;
    let campaign_id = existing.campaign_id;
    if let Some(Some(leader_id)) = request.leader_id {
        ensure_in_campaign(&txn, EntityKind::Character, campaign_id, leader_id, "leaderId").await?;
    }
    if let Some(Some(headquarters_id)) = request.headquarters_id {
        ensure_in_campaign(&txn, EntityKind::Location, campaign_id, headquarters_id, "headquartersId").await?;
    }

    let mut active = existing.into_active_model();
    patch(&mut active.name, patched_label(request.name, "Name")?);
    patch(&mut active.kind, request.kind);
    patch(&mut active.description, request.description);
    patch(&mut active.status, request.status);
    patch(&mut active.founding, request.founding);
    patch(&mut active.leader_id, request.leader_id);
    patch(&mut active.headquarters_id, request.headquarters_id);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;

    if let Some(member_ids) = request.member_ids {
        let member_ids: BTreeSet<i32> = member_ids.into_iter().collect();
        for &character_id in &member_ids {
            ensure_in_campaign(&txn, EntityKind::Character, campaign_id, character_id, "memberIds").await?;
        }
        organization_member::Entity::delete_many()
            .filter(organization_member::Column::OrganizationId.eq(id))
            .exec(&txn)
            .await?;
        add_members(&txn, member_ids.iter().map(|&character_id| (id, character_id))).await?;
        info!("organization {} now has {} members", id, member_ids.len());
    }

    let detail = organization_detail(&txn, updated).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(detail))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = i32, Path, description = "Session ID")),
    responses((status = 200, body = SessionDetail), (status = 404, body = ErrorBody))
)]
pub async fn get_session(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<SessionDetail>, ApiError> {
    let session = find_session(db.as_ref(), id).await?;
    let mut links = entities_of_session(db.as_ref(), id).await?;
    let mut refs = HashMap::new();
    for kind in [
        EntityKind::Character,
        EntityKind::Location,
        EntityKind::Organization,
        EntityKind::Item,
        EntityKind::Lore,
    ] {
        let ids = links.remove(&kind).unwrap_or_default();
        refs.insert(kind, name_refs_by_ids(db.as_ref(), kind, ids).await?);
    }
    let mut take = |kind: EntityKind| refs.remove(&kind).unwrap_or_default();
    Ok(ApiResponse::ok(SessionDetail {
        characters: take(EntityKind::Character),
        locations: take(EntityKind::Location),
        organizations: take(EntityKind::Organization),
        items: take(EntityKind::Item),
        lore: take(EntityKind::Lore),
        session,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/sessions/{id}",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, body = session_summary::Model),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_session(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(request): Json<UpdateSessionRequest>,
) -> Result<ApiResponse<session_summary::Model>, ApiError> {
    let txn = begin_write_transaction(db.as_ref()).await?;
    let mut active = find_session(&txn, id).await?.into_active_model();
    patch(&mut active.title, patched_label(request.title, "Title")?);
    patch(&mut active.chapter_title, request.chapter_title);
    patch(&mut active.recap, request.recap);
    patch(&mut active.outline, request.outline);
    patch(&mut active.notes, request.notes);
    active.updated_at = Set(now_standard_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(ApiResponse::ok(updated))
}

/// Folds curated notes into the session and the wiki.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/enhance",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = EnhanceRequest,
    responses(
        (status = 200, body = EnhanceResponse),
        (status = 404, body = ErrorBody),
        (status = 500, body = ErrorBody),
    )
)]
pub async fn enhance_session_notes(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(ai): Extension<Arc<dyn TextGenerator>>,
    Json(request): Json<EnhanceRequest>,
) -> Result<ApiResponse<EnhanceResponse>, ApiError> {
    let input = EnhanceInput {
        recap: request.recap,
        outline: request.outline,
        quotes: request.quotes,
        notes: request.notes,
        current_storybook: request.current_storybook,
    };
    let outcome = enhance_session(db.as_ref(), ai.as_ref(), id, input).await?;
    Ok(ApiResponse::ok(EnhanceResponse { success: true, outcome }))
}
