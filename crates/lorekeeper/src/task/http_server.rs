use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ai::TextGenerator;
use crate::api::handler::{
    enhance_session_notes, generate_session, get_campaign, get_campaign_lists, get_character, get_item, get_location,
    get_lore, get_organization, get_session, list_campaign_characters, list_campaign_items, list_campaign_locations,
    list_campaign_lore, list_campaign_organizations, list_campaigns, list_entity_names, merge_campaign_entities,
    replace_campaign_text, update_character, update_item, update_location, update_lore, update_organization,
    update_session, ApiDoc,
};
use crate::utils::signal::terminate;

pub fn router(db: Arc<DatabaseConnection>, ai: Arc<dyn TextGenerator>) -> Router {
    Router::new()
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/campaigns/{id}", get(get_campaign))
        .route("/api/campaigns/{id}/characters", get(list_campaign_characters))
        .route("/api/campaigns/{id}/locations", get(list_campaign_locations))
        .route("/api/campaigns/{id}/organizations", get(list_campaign_organizations))
        .route("/api/campaigns/{id}/items", get(list_campaign_items))
        .route("/api/campaigns/{id}/lore", get(list_campaign_lore))
        .route("/api/campaigns/{id}/entities", get(list_entity_names))
        .route("/api/campaigns/{id}/lists", get(get_campaign_lists))
        .route("/api/campaigns/{id}/merge", post(merge_campaign_entities))
        .route("/api/campaigns/{id}/replace", post(replace_campaign_text))
        .route("/api/generate", post(generate_session))
        .route("/api/characters/{id}", get(get_character).patch(update_character))
        .route("/api/locations/{id}", get(get_location).patch(update_location))
        .route("/api/items/{id}", get(get_item).patch(update_item))
        .route("/api/lore/{id}", get(get_lore).patch(update_lore))
        .route("/api/organizations/{id}", get(get_organization).patch(update_organization))
        .route("/api/sessions/{id}", get(get_session).patch(update_session))
        .route("/api/sessions/{id}/enhance", post(enhance_session_notes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(db))
        .layer(Extension(ai))
        .layer(CorsLayer::permissive())
}

/// Serves the API until Ctrl-C or SIGTERM.
pub async fn http_server(db: Arc<DatabaseConnection>, ai: Arc<dyn TextGenerator>, bind_address: SocketAddr) -> Result<()> {
    let app = router(db, ai);
    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    let local_addr = listener.local_addr()?;
    info!("HTTP API listening on http://{}", local_addr);
    info!("Swagger UI at http://{}/swagger-ui", local_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(terminate())
        .await
        .context("HTTP server stopped with an error")?;
    info!("HTTP server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::database::setup_test_database;
    use crate::wiki::test_support::{
        create_campaign, create_character, create_location, create_organization, create_session, CannedGenerator,
    };

    struct TestApp {
        app: Router,
        db: Arc<DatabaseConnection>,
    }

    impl TestApp {
        async fn new(replies: Vec<Option<&str>>) -> Self {
            let db = Arc::new(setup_test_database().await);
            let ai: Arc<dyn TextGenerator> = Arc::new(CannedGenerator::new(replies));
            Self {
                app: router(db.clone(), ai),
                db,
            }
        }

        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }
    }

    #[tokio::test]
    async fn test_missing_campaign_is_404_with_error_body() {
        let test = TestApp::new(vec![]).await;
        let (status, body) = test.send(Method::GET, "/api/campaigns/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Campaign 999 not found"}));
    }

    #[tokio::test]
    async fn test_generate_then_browse() {
        let reply = r#"{
            "characters": [{"name": "Lita", "type": "PC"}, {"name": "Sildar"}],
            "locations": [{"name": "Phandalin"}],
            "sessionSummary": {"title": "Arrival", "notableQuotes": ["Onward!"]}
        }"#;
        let test = TestApp::new(vec![Some(reply)]).await;

        let (status, body) = test
            .send(
                Method::POST,
                "/api/generate",
                Some(json!({"campaignName": "Lost Mine", "transcript": "We arrived in Phandalin."})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "AI processing complete!");
        assert_eq!(body["sessionNumber"], 1);
        assert_eq!(body["counts"]["characters"], 2);
        let campaign_id = body["campaignId"].as_i64().unwrap();
        let session_id = body["sessionId"].as_i64().unwrap();

        let (_, campaigns) = test.send(Method::GET, "/api/campaigns", None).await;
        assert_eq!(campaigns[0]["name"], "Lost Mine");
        assert_eq!(campaigns[0]["sessionCount"], 1);

        let (_, session) = test.send(Method::GET, &format!("/api/sessions/{}", session_id), None).await;
        assert_eq!(session["title"], "Arrival");
        assert_eq!(session["notableQuotes"], json!([{"quote": "Onward!"}]));
        let names: Vec<&str> = session["characters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Lita", "Sildar"]);

        let (_, names) = test
            .send(
                Method::GET,
                &format!("/api/campaigns/{}/entities?type=character", campaign_id),
                None,
            )
            .await;
        assert_eq!(names, json!(["Lita", "Sildar"]));
    }

    #[tokio::test]
    async fn test_generate_requires_fields() {
        let test = TestApp::new(vec![]).await;
        let (status, body) = test
            .send(Method::POST, "/api/generate", Some(json!({"campaignName": "Lost Mine"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Transcript is required");
    }

    #[tokio::test]
    async fn test_merge_and_replace_endpoints() {
        let test = TestApp::new(vec![]).await;
        let campaign_id = create_campaign(&test.db, "Lost Mine").await;
        create_character(&test.db, campaign_id, "Lita").await;
        create_character(&test.db, campaign_id, "Lidda").await;

        let merge_uri = format!("/api/campaigns/{}/merge", campaign_id);
        let (status, body) = test
            .send(
                Method::POST,
                &merge_uri,
                Some(json!({"type": "Dragon", "sourceName": "Lita", "targetName": "Lidda"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid type: Dragon");

        let (status, body) = test
            .send(
                Method::POST,
                &merge_uri,
                Some(json!({"type": "Character", "sourceName": "Ghost", "targetName": "Lidda"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Source \"Ghost\" not found.");

        let (status, body) = test
            .send(
                Method::POST,
                &merge_uri,
                Some(json!({"type": "Character", "sourceName": "Lita", "targetName": "Lidda"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["kind"], "Character");

        let (status, body) = test
            .send(
                Method::POST,
                &format!("/api/campaigns/{}/replace", campaign_id),
                Some(json!({"find": "Lidda", "replace": "Lita"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Replacement complete!", "count": 1}));

        let (status, _) = test
            .send(
                Method::POST,
                &format!("/api/campaigns/{}/replace", campaign_id),
                Some(json!({"find": "", "replace": "x"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_character() {
        let test = TestApp::new(vec![]).await;
        let campaign_id = create_campaign(&test.db, "Lost Mine").await;
        let other_campaign = create_campaign(&test.db, "Curse of Strahd").await;
        let lita = create_character(&test.db, campaign_id, "Lita").await;
        create_character(&test.db, campaign_id, "Sildar").await;
        let barovia = create_location(&test.db, other_campaign, "Barovia").await;
        let uri = format!("/api/characters/{}", lita);

        let (status, body) = test
            .send(Method::PATCH, &uri, Some(json!({"level": "7", "hp": "lots", "class": "Rogue"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], 7);
        assert_eq!(body["hp"], Value::Null);
        assert_eq!(body["class"], "Rogue");
        assert_eq!(body["name"], "Lita");

        let (status, _) = test.send(Method::PATCH, &uri, Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = test.send(Method::PATCH, &uri, Some(json!({"name": "Sildar"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("already exists"));

        let (status, _) = test.send(Method::PATCH, &uri, Some(json!({"originId": barovia}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = test.send(Method::PATCH, &uri, Some(json!({"class": null}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["class"], Value::Null);
        assert_eq!(body["level"], 7);
    }

    #[tokio::test]
    async fn test_patch_organization_relations() {
        let test = TestApp::new(vec![]).await;
        let campaign_id = create_campaign(&test.db, "Lost Mine").await;
        let other_campaign = create_campaign(&test.db, "Curse of Strahd").await;
        let org = create_organization(&test.db, campaign_id, "Lords' Alliance").await;
        let sildar = create_character(&test.db, campaign_id, "Sildar").await;
        let lita = create_character(&test.db, campaign_id, "Lita").await;
        let strahd = create_character(&test.db, other_campaign, "Strahd").await;
        let phandalin = create_location(&test.db, campaign_id, "Phandalin").await;
        let uri = format!("/api/organizations/{}", org);

        let (status, body) = test
            .send(
                Method::PATCH,
                &uri,
                Some(json!({"leaderId": sildar, "headquartersId": phandalin, "memberIds": [sildar, lita, lita]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leader"]["name"], "Sildar");
        assert_eq!(body["headquarters"]["name"], "Phandalin");
        assert_eq!(body["members"].as_array().unwrap().len(), 2);

        let (status, _) = test.send(Method::PATCH, &uri, Some(json!({"leaderId": strahd}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = test
            .send(Method::PATCH, &uri, Some(json!({"leaderId": null, "memberIds": [lita]})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leader"], Value::Null);
        assert_eq!(body["headquarters"]["name"], "Phandalin");
        assert_eq!(body["members"][0]["name"], "Lita");
        assert_eq!(body["members"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_session_patch_and_enhance() {
        let test = TestApp::new(vec![]).await;
        let campaign_id = create_campaign(&test.db, "Lost Mine").await;
        let session_id = create_session(&test.db, campaign_id, 1).await;

        let (status, body) = test
            .send(
                Method::PATCH,
                &format!("/api/sessions/{}", session_id),
                Some(json!({"chapterTitle": "Chapter One", "recap": "They met."})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chapterTitle"], "Chapter One");
        assert_eq!(body["title"], "Session 1");

        let (status, body) = test
            .send(
                Method::POST,
                &format!("/api/sessions/{}/enhance", session_id),
                Some(json!({
                    "campaignId": "ignored",
                    "quotes": "\"Onward!\" (Lita leading the way)",
                    "notes": "ITEMS:\n- Rope: 50 feet"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["enhancedRecap"], "They met.");
        assert_eq!(body["quotes"][0]["speaker"], "Lita");

        let (_, session) = test.send(Method::GET, &format!("/api/sessions/{}", session_id), None).await;
        assert_eq!(session["items"], json!([{"id": 1, "name": "Rope"}]));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let test = TestApp::new(vec![]).await;
        let (status, body) = test.send(Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/campaigns/{id}/merge"].is_object());
    }
}
