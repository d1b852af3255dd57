use crate::registry::CardRegistry;
use crate::render::{render_card_page, PageExtras};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use leadcard_app::application::{LeadCard, ShareOutcome};
use leadcard_app::domain::{CardSnapshot, RecordFields};
use leadcard_app::AppContext;
use leadcard_errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    ctx: AppContext,
    cards: CardRegistry,
}

impl ApiState {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            cards: CardRegistry::new(),
        }
    }

    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }
}

#[derive(Deserialize)]
pub struct CreateCardRequest {
    #[serde(flatten)]
    record: RecordFields,
    #[serde(default, rename = "thumbsUpcount", alias = "thumbsUpCount")]
    thumbs_up_count: Option<Value>,
}

#[derive(Serialize)]
pub struct CardResponse {
    id: Uuid,
    #[serde(flatten)]
    card: CardSnapshot,
}

#[derive(Serialize)]
pub struct CopyResponse {
    text: String,
    card: CardResponse,
}

#[derive(Serialize)]
pub struct ShareResponse {
    outcome: ShareOutcome,
}

/// `?redirect=view` sends form posts from the HTML view back to it.
#[derive(Deserialize, Default)]
pub struct ActionParams {
    redirect: Option<String>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/cards", post(create_card))
        .route("/cards/{id}", get(get_card).delete(delete_card))
        .route("/cards/{id}/upvote", post(upvote))
        .route("/cards/{id}/downvote", post(downvote))
        .route("/cards/{id}/notification/dismiss", post(dismiss_notification))
        .route("/cards/{id}/copy", post(copy))
        .route("/cards/{id}/share", post(share))
        .route("/cards/{id}/text", get(share_text))
        .route("/cards/{id}/view", get(view))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn card_response(id: Uuid, card: &LeadCard) -> CardResponse {
    CardResponse {
        id,
        card: card.snapshot(),
    }
}

fn respond(id: Uuid, card: &LeadCard, params: &ActionParams) -> Response {
    match params.redirect.as_deref() {
        Some("view") => Redirect::to(&format!("/cards/{}/view", id)).into_response(),
        _ => Json(card_response(id, card)).into_response(),
    }
}

async fn create_card(
    State(state): State<ApiState>,
    Json(request): Json<CreateCardRequest>,
) -> impl IntoResponse {
    let card = state
        .ctx
        .open_card(request.record, request.thumbs_up_count.as_ref());
    let (id, card) = state.cards.insert(card);
    tracing::info!(
        "Opened card {} for ticket {} ({} live)",
        id,
        card.record().ticket_id,
        state.cards.len()
    );
    (StatusCode::CREATED, Json(card_response(id, &card)))
}

async fn get_card(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CardResponse>, AppError> {
    let card = state.cards.get(id)?;
    Ok(Json(card_response(id, &card)))
}

async fn delete_card(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.cards.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upvote(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Result<Response, AppError> {
    let card = state.cards.get(id)?;
    report_vote(id, card.upvote().await);
    Ok(respond(id, &card, &params))
}

async fn downvote(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Result<Response, AppError> {
    let card = state.cards.get(id)?;
    report_vote(id, card.downvote().await);
    Ok(respond(id, &card, &params))
}

/// Vote failures already reached the card's notification; the snapshot
/// carries them, so the request itself still succeeds.
fn report_vote<T: std::fmt::Debug>(id: Uuid, result: Result<T, AppError>) {
    match result {
        Ok(outcome) => tracing::debug!("Card {} vote outcome: {:?}", id, outcome),
        Err(e) => tracing::info!("Card {} vote not applied: {}", id, e),
    }
}

async fn dismiss_notification(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Result<Response, AppError> {
    let card = state.cards.get(id)?;
    card.dismiss_notification();
    Ok(respond(id, &card, &params))
}

async fn copy(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Result<Response, AppError> {
    let card = state.cards.get(id)?;
    let text = card.copy_to_clipboard().await;
    if params.redirect.as_deref() == Some("view") {
        return Ok(respond(id, &card, &params));
    }
    Ok(Json(CopyResponse {
        text,
        card: card_response(id, &card),
    })
    .into_response())
}

async fn share(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Result<Response, AppError> {
    let card = state.cards.get(id)?;
    let outcome = card.share().await;
    if params.redirect.as_deref() == Some("view") {
        return Ok(respond(id, &card, &params));
    }
    Ok(Json(ShareResponse { outcome }).into_response())
}

async fn share_text(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<String, AppError> {
    let card = state.cards.get(id)?;
    Ok(card.share_text())
}

async fn view(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let card: Arc<LeadCard> = state.cards.get(id)?;
    let extras = PageExtras {
        verified: card.verified_ago(),
        can_share: card.can_share(),
        copied_text: card.last_copied(),
    };
    Ok(Html(render_card_page(id, card.record(), &card.snapshot(), &extras)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use leadcard_app::application::{CardServices, ShareTarget};
    use leadcard_app::domain::VoteAck;
    use leadcard_app::infrastructure::scripted::{RecordingShareTarget, ScriptedVoteService};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(service: Arc<ScriptedVoteService>) -> Router {
        app_with_share(service, None)
    }

    fn app_with_share(
        service: Arc<ScriptedVoteService>,
        share_target: Option<Arc<dyn ShareTarget>>,
    ) -> Router {
        let ctx = AppContext::new(CardServices {
            vote_service: service,
            clipboard: None,
            share_target,
            origin: "https://leads.example.org".to_string(),
        });
        router(ApiState::new(ctx))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(app: &Router, body: Value) -> String {
        let (status, card) = send_json(app, "POST", "/cards", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        card["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_vote_flow_over_http() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        service.push_ack(VoteAck::new("500", "down"));
        let app = app(service.clone());

        let id = create(
            &app,
            json!({ "ticketId": "T-7", "resourceType": "Oxygen", "thumbsUpcount": "3" }),
        )
        .await;

        let (_, card) = send_json(&app, "GET", &format!("/cards/{}", id), None).await;
        assert_eq!(card["vote"]["count"], 3);
        assert_eq!(card["phase"], "neutral");

        let (status, card) = send_json(&app, "POST", &format!("/cards/{}/upvote", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["vote"]["count"], 4);
        assert_eq!(card["permissions"]["can_upvote"], false);
        assert_eq!(card["permissions"]["can_downvote"], true);

        let (status, card) = send_json(&app, "POST", &format!("/cards/{}/downvote", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["vote"]["count"], 4);
        assert_eq!(card["phase"], "upvoted");
        assert_eq!(card["notification"]["visible"], true);
        assert_eq!(card["notification"]["text"], "Please try again later.");

        let (_, card) = send_json(
            &app,
            "POST",
            &format!("/cards/{}/notification/dismiss", id),
            None,
        )
        .await;
        assert_eq!(card["notification"]["visible"], false);

        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_copy_and_text() {
        let app = app(Arc::new(ScriptedVoteService::new()));
        let id = create(&app, json!({ "ticketId": "T-8", "resourceType": "Oxygen", "phone": "12345" })).await;

        let (_, copied) = send_json(&app, "POST", &format!("/cards/{}/copy", id), None).await;
        let text = copied["text"].as_str().unwrap();
        assert!(text.starts_with("Oxygen lead information\nPhone Number - 12345"));
        assert!(text.ends_with("visit: https://leads.example.org"));
        assert_eq!(copied["card"]["notification"]["text"], "Information Copied to Clipboard");

        let (status, body) = send(&app, "GET", &format!("/cards/{}/text", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), text);
    }

    #[tokio::test]
    async fn test_share_without_target_is_unavailable() {
        let app = app(Arc::new(ScriptedVoteService::new()));
        let id = create(&app, json!({ "ticketId": "T-9" })).await;

        let (_, body) = send_json(&app, "POST", &format!("/cards/{}/share", id), None).await;
        assert_eq!(body["outcome"], "unavailable");
    }

    #[tokio::test]
    async fn test_view_form_posts_redirect_back() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        let app = app(service);
        let id = create(&app, json!({ "ticketId": "T-10", "title": "Depot" })).await;

        let (status, _) = send(&app, "POST", &format!("/cards/{}/upvote?redirect=view", id), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (status, page) = send(&app, "GET", &format!("/cards/{}/view", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("<h2>Depot</h2>"));
        assert!(page.contains(r#"<span class="badge badge--up">1</span>"#));
    }

    #[tokio::test]
    async fn test_unknown_and_deleted_cards() {
        let app = app(Arc::new(ScriptedVoteService::new()));
        let missing = Uuid::new_v4();

        let (status, body) = send_json(&app, "GET", &format!("/cards/{}", missing), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "This lead is no longer available.");

        let id = create(&app, json!({ "ticketId": "T-11" })).await;
        let (status, _) = send(&app, "DELETE", &format!("/cards/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/cards/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_copy_with_other_redirect_returns_text() {
        let app = app(Arc::new(ScriptedVoteService::new()));
        let id = create(&app, json!({ "ticketId": "T-12", "title": "Depot" })).await;

        let (status, copied) =
            send_json(&app, "POST", &format!("/cards/{}/copy?redirect=elsewhere", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(copied["text"].as_str().unwrap().starts_with("Depot\n"));
    }

    #[tokio::test]
    async fn test_view_shows_copied_text_and_share_form() {
        let target = Arc::new(RecordingShareTarget::new());
        let app = app_with_share(Arc::new(ScriptedVoteService::new()), Some(target.clone()));
        let id = create(
            &app,
            json!({ "ticketId": "T-13", "title": "Depot", "resourceType": "Oxygen", "subResourceType": "Cylinder" }),
        )
        .await;

        let (status, _) = send(&app, "POST", &format!("/cards/{}/copy?redirect=view", id), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (status, _) = send(&app, "POST", &format!("/cards/{}/share?redirect=view", id), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(target.shared().len(), 1);

        let (_, page) = send(&app, "GET", &format!("/cards/{}/view", id), None).await;
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("<small>Oxygen / Cylinder</small>"));
        assert!(page.contains(&format!("/cards/{}/share?redirect=view", id)));
        assert!(page.contains(r#"<textarea class="copied" readonly>Oxygen lead information"#));
    }

    #[tokio::test]
    async fn test_view_hides_share_without_target() {
        let app = app(Arc::new(ScriptedVoteService::new()));
        let id = create(&app, json!({ "ticketId": "T-14" })).await;

        let (_, page) = send(&app, "GET", &format!("/cards/{}/view", id), None).await;
        let page = String::from_utf8(page).unwrap();

        assert!(!page.contains("/share?redirect=view"));
        assert!(!page.contains("<textarea"));
    }
}
