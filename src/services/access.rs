// src/services/access.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::{auth::User, principal::Principal},
};

/// Resolve o usuário autenticado para o seu papel efetivo.
///
/// `is_organizer` tem precedência sobre `is_agent`. Qualquer caso em que a
/// organização não pode ser determinada é `MissingRoleContext`, nunca uma
/// lista vazia.
#[derive(Clone)]
pub struct AccessService {
    users: Arc<dyn UserStore>,
}

impl AccessService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn resolve(&self, user: &User) -> Result<Principal, AppError> {
        if user.is_organizer {
            let organization = self
                .users
                .find_organization_by_owner(user.id)
                .await?
                .ok_or(AppError::MissingRoleContext)?;

            return Ok(Principal::Organizer {
                user_id: user.id,
                organization_id: organization.id,
            });
        }

        if user.is_agent {
            let agent = self
                .users
                .find_agent_by_user(user.id)
                .await?
                .ok_or(AppError::MissingRoleContext)?;

            return Ok(Principal::Agent {
                user_id: user.id,
                agent_id: agent.id,
                organization_id: agent.organization_id,
            });
        }

        Err(AppError::MissingRoleContext)
    }
}
