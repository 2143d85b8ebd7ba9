// API handlers
//
// Each handler is one repository call. Path identifiers are percent-decoded
// once more after routing, so an identifier encoded twice by a client still
// resolves.

use super::error::ApiError;
use super::payload::{decode_identifier, Payload};
use super::AppState;
use crate::stats::{DashboardStats, RETENTION};
use crate::store::{Entity, EntityKind};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct DashboardResponse {
    success: bool,
    #[serde(flatten)]
    stats: DashboardStats,
    retention: &'static str,
}

// ============================================================================
// HEALTH
// ============================================================================

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

// ============================================================================
// MEMBERS
// ============================================================================

/// GET /api/members
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<Entity>>> {
    let members = state
        .repo
        .list_members()
        .map_err(ApiError::internal("Failed to fetch members"))?;
    Ok(Json(members))
}

/// GET /api/members/:id - matches on id or name
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Entity>> {
    let id = decode_identifier(&id);
    state
        .repo
        .find_member(&id)
        .map_err(ApiError::internal("Failed to fetch member"))?
        .map(Json)
        .ok_or(ApiError::NotFound(EntityKind::Member))
}

/// POST /api/members
pub async fn create_member(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<impl IntoResponse> {
    let member = state
        .repo
        .create(EntityKind::Member, payload)
        .map_err(ApiError::internal("Failed to add member"))?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/members/:id
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(patch): Payload,
) -> ApiResult<Json<Entity>> {
    let id = decode_identifier(&id);
    state
        .repo
        .update_member(&id, &patch)
        .map_err(ApiError::internal("Failed to update member"))?
        .map(Json)
        .ok_or(ApiError::NotFound(EntityKind::Member))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = decode_identifier(&id);
    let removed = state
        .repo
        .delete_member(&id)
        .map_err(ApiError::internal("Failed to delete"))?;

    if !removed {
        return Err(ApiError::NotFound(EntityKind::Member));
    }
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// GET /api/dashboard-stats
pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state
        .repo
        .dashboard_stats()
        .map_err(ApiError::internal("Failed to compute stats"))?;

    Ok(Json(DashboardResponse {
        success: true,
        stats,
        retention: RETENTION,
    }))
}

// ============================================================================
// CLASSES / STAFF / INVOICES
// ============================================================================

/// GET /api/classes
pub async fn list_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<Entity>>> {
    let classes = state
        .repo
        .list_classes()
        .map_err(ApiError::internal("Failed to fetch classes"))?;
    Ok(Json(classes))
}

/// POST /api/classes
pub async fn create_class(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<impl IntoResponse> {
    let class = state
        .repo
        .create(EntityKind::Class, payload)
        .map_err(ApiError::internal("Failed to add class"))?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// GET /api/staff
pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Json<Vec<Entity>>> {
    let staff = state
        .repo
        .list_staff()
        .map_err(ApiError::internal("Failed to fetch staff"))?;
    Ok(Json(staff))
}

/// POST /api/staff
pub async fn create_staff(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<impl IntoResponse> {
    let staff = state
        .repo
        .create(EntityKind::Staff, payload)
        .map_err(ApiError::internal("Failed to add staff"))?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// GET /api/invoices
pub async fn list_invoices(State(state): State<AppState>) -> ApiResult<Json<Vec<Entity>>> {
    let invoices = state
        .repo
        .list_invoices()
        .map_err(ApiError::internal("Failed to fetch invoices"))?;
    Ok(Json(invoices))
}

/// POST /api/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    Payload(payload): Payload,
) -> ApiResult<impl IntoResponse> {
    let invoice = state
        .repo
        .create(EntityKind::Invoice, payload)
        .map_err(ApiError::internal("Failed to add invoice"))?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// PUT /api/invoices/:id
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(patch): Payload,
) -> ApiResult<Json<Entity>> {
    let id = decode_identifier(&id);
    state
        .repo
        .update_invoice(&id, &patch)
        .map_err(ApiError::internal("Failed to update invoice"))?
        .map(Json)
        .ok_or(ApiError::NotFound(EntityKind::Invoice))
}
