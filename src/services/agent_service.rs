// src/services/agent_service.rs

use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        auth::NewUser,
        crm::{AgentDetail, AgentProfile},
        principal::Principal,
    },
    services::{auth::hash_password, notifier::Notifier},
};

// Gestão de agentes: tudo aqui é exclusivo do organizador
#[derive(Clone)]
pub struct AgentService {
    crm: Arc<dyn CrmStore>,
    notifier: Notifier,
    bcrypt_cost: u32,
}

impl AgentService {
    pub fn new(crm: Arc<dyn CrmStore>, notifier: Notifier, bcrypt_cost: u32) -> Self {
        Self {
            crm,
            notifier,
            bcrypt_cost,
        }
    }

    pub async fn list_agents(&self, principal: &Principal) -> Result<Vec<AgentDetail>, AppError> {
        let organization_id = principal.require_organizer()?;
        self.crm.list_agents(organization_id).await
    }

    pub async fn get_agent(
        &self,
        principal: &Principal,
        agent_id: Uuid,
    ) -> Result<AgentDetail, AppError> {
        let organization_id = principal.require_organizer()?;
        self.crm
            .find_agent(organization_id, agent_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Convida um agente:
    /// 1. usuário com senha provisória aleatória (será trocada no primeiro acesso)
    /// 2. linha em `agents` na organização do organizador (1 e 2 na mesma transação)
    /// 3. e-mail de convite, depois do commit
    pub async fn create_agent(
        &self,
        principal: &Principal,
        profile: AgentProfile,
    ) -> Result<AgentDetail, AppError> {
        let organization_id = principal.require_organizer()?;

        // Placeholder, não é segredo: só ocupa o lugar até o reset de senha
        let placeholder = rand::rng().random_range(0..=10_000_000u32).to_string();
        let password_hash = hash_password(placeholder, self.bcrypt_cost).await?;

        let agent = self
            .crm
            .create_agent_account(
                organization_id,
                NewUser {
                    username: profile.username,
                    email: profile.email,
                    password_hash,
                    first_name: profile.first_name,
                    last_name: profile.last_name,
                },
            )
            .await?;

        tracing::info!(
            agent_id = %agent.id,
            %organization_id,
            "🧑‍💼 Agente criado"
        );

        self.notifier.agent_invited(&agent).await;
        Ok(agent)
    }

    pub async fn update_agent(
        &self,
        principal: &Principal,
        agent_id: Uuid,
        profile: AgentProfile,
    ) -> Result<AgentDetail, AppError> {
        let organization_id = principal.require_organizer()?;
        self.crm
            .update_agent_profile(organization_id, agent_id, &profile)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Apaga o agente; os leads dele voltam a ficar sem agente.
    pub async fn delete_agent(&self, principal: &Principal, agent_id: Uuid) -> Result<(), AppError> {
        let organization_id = principal.require_organizer()?;
        if !self.crm.delete_agent(organization_id, agent_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
