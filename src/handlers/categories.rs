// src/handlers/categories.rs

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
    models::crm::{Category, CategoryDetail, CategoryListing},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(
        custom(function = "crate::common::validation::not_blank"),
        length(max = 30, message = "too_long")
    )]
    #[schema(example = "Contacted")]
    pub name: String,
}

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categorias + total de leads sem categoria", body = CategoryListing),
        (status = 403, description = "Usuário sem contexto de papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .category_service
        .list_categories(&principal)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Nome inválido"),
        (status = 403, description = "Apenas organizadores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .category_service
        .create_category(&principal, &payload.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Categoria e seus leads (no escopo do usuário)", body = CategoryDetail),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .category_service
        .get_category(&principal, category_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Categoria renomeada", body = Category),
        (status = 400, description = "Nome inválido"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_category(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .category_service
        .rename_category(&principal, category_id, &payload.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 204, description = "Categoria removida; leads ficam sem categoria"),
        (status = 403, description = "Apenas organizadores"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .category_service
        .delete_category(&principal, category_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_required_and_long_name_is_too_long() {
        let blank = CategoryPayload { name: " ".into() };
        let errors = blank.validate().unwrap_err();
        assert_eq!(errors.field_errors()["name"][0].code, "required");

        let long = CategoryPayload { name: "x".repeat(31) };
        let errors = long.validate().unwrap_err();
        assert_eq!(
            errors.field_errors()["name"][0].message.as_deref(),
            Some("too_long")
        );

        assert!(CategoryPayload { name: "Contacted".into() }.validate().is_ok());
    }
}
