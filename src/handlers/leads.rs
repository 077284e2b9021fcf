// src/handlers/leads.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, principal::CurrentPrincipal},
    models::crm::{Lead, LeadFields, LeadListing},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

// Usado tanto no POST quanto no PUT (o formulário do lead é o mesmo).
// Não existe campo de organização: ela sempre vem do principal.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    #[validate(
        custom(function = "crate::common::validation::not_blank"),
        length(max = 20, message = "too_long")
    )]
    #[schema(example = "Jane")]
    pub first_name: String,

    #[validate(
        custom(function = "crate::common::validation::not_blank"),
        length(max = 20, message = "too_long")
    )]
    #[schema(example = "Doe")]
    pub last_name: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "invalid_age"))]
    #[schema(example = 30)]
    pub age: i32,

    #[validate(
        custom(function = "crate::common::validation::not_blank"),
        length(max = 20, message = "too_long")
    )]
    #[schema(example = "555-0100")]
    pub phone_number: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "jane@x.com")]
    pub email: String,

    #[serde(default)]
    #[schema(example = "interested")]
    pub description: String,

    pub agent_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl From<LeadPayload> for LeadFields {
    fn from(payload: LeadPayload) -> Self {
        LeadFields {
            first_name: payload.first_name,
            last_name: payload.last_name,
            age: payload.age,
            phone_number: payload.phone_number,
            email: payload.email,
            description: payload.description,
            agent_id: payload.agent_id,
            category_id: payload.category_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAgentPayload {
    pub agent_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadCategoryPayload {
    // null limpa a categoria
    pub category_id: Option<Uuid>,
}

// =============================================================================
//  LEITURA
// =============================================================================

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "Leads visíveis (+ sem agente, para organizadores)", body = LeadListing),
        (status = 403, description = "Usuário sem contexto de papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .lead_service
        .list_leads(&principal)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 404, description = "Não encontrado (ou fora do escopo)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get_lead(&principal, lead_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// =============================================================================
//  MUTAÇÕES
// =============================================================================

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = LeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Agente ou categoria não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .create_lead(&principal, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = LeadPayload,
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrado (ou fora do escopo)")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .update_lead(&principal, lead_id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 204, description = "Lead removido"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrado (ou fora do escopo)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .lead_service
        .delete_lead(&principal, lead_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/leads/{id}/agent
#[utoipa::path(
    put,
    path = "/api/leads/{id}/agent",
    tag = "Leads",
    request_body = AssignAgentPayload,
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Agente atribuído", body = Lead),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Lead ou agente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_agent(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<AssignAgentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .assign_agent(&principal, lead_id, payload.agent_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

// PUT /api/leads/{id}/category
#[utoipa::path(
    put,
    path = "/api/leads/{id}/category",
    tag = "Leads",
    request_body = LeadCategoryPayload,
    params(("id" = Uuid, Path, description = "ID do Lead")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Lead),
        (status = 404, description = "Lead ou categoria não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_category(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<LeadCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .update_lead_category(&principal, lead_id, payload.category_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}
