// src/handlers/agents.rs

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
    models::crm::{AgentDetail, AgentProfile},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    #[validate(
        custom(function = "crate::common::validation::not_blank"),
        length(max = 150, message = "invalid_username")
    )]
    #[schema(example = "joao.vendas")]
    pub username: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@empresa.com")]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "too_long"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "too_long"))]
    pub last_name: String,
}

impl From<AgentPayload> for AgentProfile {
    fn from(payload: AgentPayload) -> Self {
        AgentProfile {
            username: payload.username,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
        }
    }
}

// GET /api/agents
#[utoipa::path(
    get,
    path = "/api/agents",
    tag = "Agents",
    responses(
        (status = 200, description = "Agentes da organização", body = Vec<AgentDetail>),
        (status = 403, description = "Apenas organizadores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_agents(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let agents = app_state
        .agent_service
        .list_agents(&principal)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(agents)))
}

// POST /api/agents
#[utoipa::path(
    post,
    path = "/api/agents",
    tag = "Agents",
    request_body = AgentPayload,
    responses(
        (status = 201, description = "Agente convidado", body = AgentDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas organizadores"),
        (status = 409, description = "Usuário ou e-mail já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_agent(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<AgentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let agent = app_state
        .agent_service
        .create_agent(&principal, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(agent)))
}

// GET /api/agents/{id}
#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(("id" = Uuid, Path, description = "ID do Agente")),
    responses(
        (status = 200, description = "Agente", body = AgentDetail),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_agent(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let agent = app_state
        .agent_service
        .get_agent(&principal, agent_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(agent)))
}

// PUT /api/agents/{id}
#[utoipa::path(
    put,
    path = "/api/agents/{id}",
    tag = "Agents",
    request_body = AgentPayload,
    params(("id" = Uuid, Path, description = "ID do Agente")),
    responses(
        (status = 200, description = "Agente atualizado", body = AgentDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_agent(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(agent_id): Path<Uuid>,
    Json(payload): Json<AgentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let agent = app_state
        .agent_service
        .update_agent(&principal, agent_id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(agent)))
}

// DELETE /api/agents/{id}
#[utoipa::path(
    delete,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(("id" = Uuid, Path, description = "ID do Agente")),
    responses(
        (status = 204, description = "Agente removido"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_agent(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .agent_service
        .delete_agent(&principal, agent_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
