//! Axum REST handlers for the dashboard API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use zapline_campaigns::{Campaign, CampaignStore, DispatchProgress};
use zapline_core::ZaplineError;
use zapline_directory::{
    BillingEntry, Contact, ContactTag, CreateContactRequest, CreateTagRequest,
    CreateTeamMemberRequest, DirectoryStore, TeamMember, TeamRole, UpdateContactRequest,
};
use zapline_workflow::CampaignSubmission;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryStore>,
    pub campaigns: Arc<CampaignStore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ─── Operational ───────────────────────────────────────────────────────────

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "zapline",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ─── Contacts ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    pub tag: Option<String>,
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ContactsQuery>,
) -> Json<Vec<Contact>> {
    Json(state.directory.list_contacts(query.tag.as_deref()))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> (StatusCode, Json<Contact>) {
    let contact = state.directory.create_contact(req);
    metrics::counter!("zapline.contacts.created").increment(1);
    (StatusCode::CREATED, Json(contact))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contact>, StatusCode> {
    state
        .directory
        .get_contact(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<Json<Contact>, StatusCode> {
    state
        .directory
        .update_contact(id, req)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn delete_contact(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.directory.delete_contact(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Deserialize)]
pub struct AudienceQuery {
    pub user_id: Uuid,
    pub role: TeamRole,
}

/// The contact-picker pool for a user, filtered by their role.
pub async fn audience_pool(
    State(state): State<AppState>,
    Query(query): Query<AudienceQuery>,
) -> Json<Vec<Contact>> {
    Json(state.directory.audience_pool(query.user_id, query.role))
}

// ─── Tags ──────────────────────────────────────────────────────────────────

pub async fn list_tags(State(state): State<AppState>) -> Json<Vec<ContactTag>> {
    Json(state.directory.list_tags())
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> (StatusCode, Json<ContactTag>) {
    (StatusCode::CREATED, Json(state.directory.create_tag(req)))
}

pub async fn delete_tag(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.directory.delete_tag(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ─── Team ──────────────────────────────────────────────────────────────────

pub async fn list_team(State(state): State<AppState>) -> Json<Vec<TeamMember>> {
    Json(state.directory.list_team())
}

pub async fn add_team_member(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamMemberRequest>,
) -> (StatusCode, Json<TeamMember>) {
    (
        StatusCode::CREATED,
        Json(state.directory.add_team_member(req)),
    )
}

// ─── Billing ───────────────────────────────────────────────────────────────

pub async fn list_billing(State(state): State<AppState>) -> Json<Vec<BillingEntry>> {
    Json(state.directory.list_billing())
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(State(state): State<AppState>) -> Json<Vec<Campaign>> {
    Json(state.campaigns.list())
}

/// Accepts an assembled submission. Invalid payloads come back as 422
/// with a machine-readable error body; the client keeps its draft and may
/// retry.
pub async fn submit_campaign(
    State(state): State<AppState>,
    Json(submission): Json<CampaignSubmission>,
) -> Result<(StatusCode, Json<Campaign>), (StatusCode, Json<ErrorResponse>)> {
    match state.campaigns.submit(submission).await {
        Ok(campaign) => Ok((StatusCode::CREATED, Json(campaign))),
        Err(ZaplineError::Submission(message)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "invalid_submission".to_string(),
                message,
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal".to_string(),
                message: e.to_string(),
            }),
        )),
    }
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, StatusCode> {
    state
        .campaigns
        .get(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn campaign_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DispatchProgress>, StatusCode> {
    state
        .campaigns
        .progress(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn cancel_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, (StatusCode, Json<ErrorResponse>)> {
    match state.campaigns.cancel(id) {
        Ok(campaign) => Ok(Json(campaign)),
        Err(ZaplineError::CampaignNotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "campaign_not_found".to_string(),
                message: format!("Campaign {id} not found"),
            }),
        )),
        Err(e) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "cannot_cancel".to_string(),
                message: e.to_string(),
            }),
        )),
    }
}
