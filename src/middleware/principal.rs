// src/middleware/principal.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::principal::Principal,
};

/// O principal da requisição: usuário autenticado + papel resolvido.
/// Todo handler escopado recebe este extrator em vez do usuário cru.
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);

        let principal = app_state
            .access_service
            .resolve(&user)
            .await
            .map_err(|e| e.to_api_error(&Locale::from_parts(parts), &app_state.i18n_store))?;

        Ok(CurrentPrincipal(principal))
    }
}
