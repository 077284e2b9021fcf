// src/models/principal.rs

use serde::Serialize;
use uuid::Uuid;

use crate::common::error::AppError;
#[cfg(test)]
use crate::models::crm::Lead;

/// O papel efetivo de quem faz a requisição, já resolvido contra o banco.
///
/// `users.is_organizer` / `users.is_agent` permitem combinações ambíguas
/// (as duas ligadas, as duas desligadas). Depois da resolução só existem
/// estes dois casos, e cada um já carrega a organização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum Principal {
    #[serde(rename_all = "camelCase")]
    Organizer {
        user_id: Uuid,
        organization_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Agent {
        user_id: Uuid,
        agent_id: Uuid,
        organization_id: Uuid,
    },
}

impl Principal {
    pub fn user_id(&self) -> Uuid {
        match self {
            Principal::Organizer { user_id, .. } | Principal::Agent { user_id, .. } => *user_id,
        }
    }

    pub fn organization_id(&self) -> Uuid {
        match self {
            Principal::Organizer { organization_id, .. }
            | Principal::Agent { organization_id, .. } => *organization_id,
        }
    }

    pub fn is_organizer(&self) -> bool {
        matches!(self, Principal::Organizer { .. })
    }

    /// Organizador: a organização inteira. Agente: só os leads dele.
    pub fn lead_scope(&self) -> LeadScope {
        match self {
            Principal::Organizer { organization_id, .. } => LeadScope {
                organization_id: *organization_id,
                agent_id: None,
            },
            Principal::Agent {
                agent_id,
                organization_id,
                ..
            } => LeadScope {
                organization_id: *organization_id,
                agent_id: Some(*agent_id),
            },
        }
    }

    /// Guarda das operações exclusivas do organizador.
    /// Devolve a organização para já ser usada no filtro.
    pub fn require_organizer(&self) -> Result<Uuid, AppError> {
        match self {
            Principal::Organizer { organization_id, .. } => Ok(*organization_id),
            Principal::Agent { .. } => Err(AppError::OrganizerOnly),
        }
    }
}

/// O filtro de visibilidade de leads: sempre a organização, e para agentes
/// também a identidade estrita do agente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadScope {
    pub organization_id: Uuid,
    pub agent_id: Option<Uuid>,
}

// Espelho em memória da cláusula de escopo do SQL (usado pelo store de testes)
#[cfg(test)]
impl LeadScope {
    pub fn admits(&self, lead: &Lead) -> bool {
        if lead.organization_id != self.organization_id {
            return false;
        }
        match self.agent_id {
            Some(agent_id) => lead.agent_id == Some(agent_id),
            None => true,
        }
    }
}
