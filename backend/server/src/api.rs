//! Axum handlers: generated marketing pages, the sitemap, and the funnel
//! session API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use funnel_core::validate::{validate_lawyer_application, DetailsInput, LawyerApplication};
use funnel_core::{catalog, FunnelState, PaymentChoice, ServiceType};

use crate::analytics::FunnelEvent;
use crate::config::Config;
use crate::errors::ServerError;
use crate::gateway::{CheckoutOutcome, HttpGateway};
use crate::orchestrator::Orchestrator;
use crate::sitemap;

pub struct AppState {
    pub config: Config,
    pub orchestrator: Orchestrator,
    pub gateway: HttpGateway,
    pub client: Client,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::SessionNotFound => StatusCode::NOT_FOUND,
            ServerError::Funnel(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ServerError>;

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Deserialize)]
pub struct PageQuery {
    /// The `?type=<service>` deep link; auto-opens the form pre-populated.
    #[serde(rename = "type")]
    pub service_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Deserialize)]
pub struct OpenRequest {
    pub service: Option<ServiceType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    pub name: String,
    pub location: String,
    pub country_code: String,
    pub whatsapp_number: String,
    #[serde(default = "default_consent")]
    pub whatsapp_consent: bool,
    pub service_details: Option<String>,
    pub payment_choice: Option<PaymentChoice>,
}

fn default_consent() -> bool {
    true
}

#[derive(Deserialize)]
pub struct InteractionRequest {
    pub field: String,
    pub action: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub resumed: bool,
    pub banner_eligible: bool,
    pub state: FunnelState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerDismissResponse {
    pub count: u32,
    pub suppressed: bool,
}

// ─────────────────────────────────────────────────────────
// Health & sitemap
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /sitemap.xml`
pub async fn sitemap_xml(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let xml = sitemap::render_sitemap(&state.config.site_base_url, &state.config.route_caps);
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

// ─────────────────────────────────────────────────────────
// Generated pages
// ─────────────────────────────────────────────────────────

fn parse_deep_link(query: &PageQuery) -> Option<ServiceType> {
    query
        .service_type
        .as_deref()
        .and_then(ServiceType::from_slug)
}

/// `GET /consultation/:city`
pub async fn consultation_page(
    Path(city): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    if !catalog::is_known_city(&city) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(crate::pages::render_consultation_page(
        &city,
        parse_deep_link(&query),
    ))
    .into_response()
}

/// `GET /send-a-legal-notice/:topic`
pub async fn topic_page(Path(topic): Path<String>, Query(query): Query<PageQuery>) -> Response {
    if catalog::topic_title(&topic).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(crate::pages::render_topic_page(
        &topic,
        None,
        parse_deep_link(&query),
    ))
    .into_response()
}

/// `GET /send-a-legal-notice/:topic/:city`
pub async fn topic_city_page(
    Path((topic, city)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    if catalog::topic_title(&topic).is_none() || !catalog::is_known_city(&city) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(crate::pages::render_topic_page(
        &topic,
        Some(&city),
        parse_deep_link(&query),
    ))
    .into_response()
}

// ─────────────────────────────────────────────────────────
// Funnel session API
// ─────────────────────────────────────────────────────────

/// `POST /api/funnel/session`
pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.orchestrator.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// `GET /api/funnel/:id`
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    Ok(Json(state.orchestrator.sessions.get(id).await?))
}

/// `POST /api/funnel/:id/open`
pub async fn open_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<OpenRequest>,
) -> ApiResult<Json<FunnelState>> {
    let (_, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| s.open_form(body.service))
        .await?;
    state.orchestrator.analytics.emit(
        FunnelEvent::FormOpened,
        json!({ "service": body.service.map(|s| s.as_str()) }),
    );
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/next`
pub async fn next_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    let (_, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| s.next_step())
        .await?;
    let event = if updated.step == funnel_core::FunnelStep::Outcome {
        FunnelEvent::OutcomeViewed
    } else {
        FunnelEvent::StepViewed
    };
    state
        .orchestrator
        .analytics
        .emit(event, json!({ "step": updated.step.index() }));
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/prev`
pub async fn prev_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    let (_, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| s.prev_step())
        .await?;
    state
        .orchestrator
        .analytics
        .emit(FunnelEvent::StepViewed, json!({ "step": updated.step.index() }));
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/close`
pub async fn close_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    let (_, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| s.close_form())
        .await?;
    state
        .orchestrator
        .analytics
        .emit(FunnelEvent::FormClosed, json!({}));
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/reset`
pub async fn reset_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    let (_, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| s.reset_form())
        .await?;
    state
        .orchestrator
        .analytics
        .emit(FunnelEvent::FormReset, json!({}));
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/details`
///
/// Validation failures come back as 400 with the blocking message; the
/// step is not advanceable until the payload passes.
pub async fn set_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<DetailsRequest>,
) -> ApiResult<Json<FunnelState>> {
    let input = DetailsInput {
        name: body.name,
        location: body.location,
        country_code: body.country_code,
        whatsapp_number: body.whatsapp_number,
        whatsapp_consent: body.whatsapp_consent,
    };
    let (result, updated) = state
        .orchestrator
        .sessions
        .with_state(id, |s| {
            s.set_details(input)?;
            s.set_service_details(body.service_details.clone());
            if let Some(choice) = body.payment_choice {
                s.set_payment_choice(choice);
            }
            Ok::<_, funnel_core::FunnelError>(())
        })
        .await?;
    result?;
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/interaction`
///
/// Field-level analytics only; never blocks or alters validation.
pub async fn field_interaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<InteractionRequest>,
) -> ApiResult<StatusCode> {
    // Touch the session so unknown ids still 404.
    state.orchestrator.sessions.get(id).await?;
    state.orchestrator.analytics.emit(
        FunnelEvent::FieldInteraction,
        json!({ "field": body.field, "action": body.action }),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/funnel/:id/submit`
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FunnelState>> {
    let updated = state.orchestrator.submit_lead(id, &state.gateway).await?;
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/pay`
pub async fn pay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let (checkout, updated) = state
        .orchestrator
        .start_payment(id, &state.gateway, &state.config.checkout_key_id)
        .await?;
    Ok(Json(json!({ "checkout": checkout, "state": updated })))
}

/// `POST /api/funnel/:id/checkout` — the overlay callback.
pub async fn checkout_callback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(outcome): Json<CheckoutOutcome>,
) -> ApiResult<Json<FunnelState>> {
    let updated = state
        .orchestrator
        .reconcile_checkout(id, outcome, &state.gateway)
        .await?;
    Ok(Json(updated))
}

/// `POST /api/funnel/:id/resume`
pub async fn resume(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResumeResponse>> {
    let (resumed, banner_eligible, session_state) = state.orchestrator.resume_pending(id).await?;
    Ok(Json(ResumeResponse {
        resumed,
        banner_eligible,
        state: session_state,
    }))
}

/// `POST /api/funnel/:id/banner-dismiss`
pub async fn banner_dismiss(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BannerDismissResponse>> {
    let now = chrono::Utc::now();
    let record =
        crate::db::register_banner_dismiss(&state.orchestrator.pool, id, now).await?;
    state
        .orchestrator
        .analytics
        .emit(FunnelEvent::BannerDismissed, json!({ "count": record.count }));
    Ok(Json(BannerDismissResponse {
        count: record.count,
        suppressed: record.banner_suppressed(now),
    }))
}

// ─────────────────────────────────────────────────────────
// Lawyer application intake
// ─────────────────────────────────────────────────────────

/// `POST /api/lawyers/apply`
///
/// Validates against the schema first; rejections are 422 with structured
/// per-field errors.  Valid applications are forwarded to the intake
/// backend when one is configured.
pub async fn lawyer_apply(
    State(state): State<Arc<AppState>>,
    Json(application): Json<LawyerApplication>,
) -> ApiResult<Response> {
    let errors = validate_lawyer_application(&application);
    if !errors.is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "errors": errors })),
        )
            .into_response());
    }

    let id = match &state.config.lawyer_intake_url {
        Some(url) => {
            let response = state.client.post(url).json(&application).send().await?;
            if !response.status().is_success() {
                return Err(ServerError::Gateway(format!(
                    "Intake backend rejected the application with status {}",
                    response.status()
                )));
            }
            let body: serde_json::Value = response.json().await?;
            body.get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| Uuid::new_v4().to_string())
        }
        None => Uuid::new_v4().to_string(),
    };

    Ok(Json(json!({ "success": true, "id": id })).into_response())
}
