// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, User},
        crm::{
            Agent, AgentDetail, AgentProfile, Category, Lead, LeadFields, LeadFilter,
            Organization,
        },
        principal::LeadScope,
    },
};

/// Usuários, organizações e a resolução de papel.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Cria o organizador e a organização dele na MESMA transação:
    /// não existe organizador sem organização.
    async fn create_organizer(&self, new_user: NewUser) -> Result<(User, Organization), AppError>;

    async fn find_organization_by_owner(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Organization>, AppError>;

    async fn find_agent_by_user(&self, user_id: Uuid) -> Result<Option<Agent>, AppError>;
}

/// Leads, agentes e categorias.
///
/// Toda leitura/escrita de lead recebe o `LeadScope` do principal e filtra por ele
/// no próprio WHERE: linha fora do escopo volta como `None`/`false`, igual a
/// linha inexistente. Agentes e categorias são filtrados pela organização.
#[async_trait]
pub trait CrmStore: Send + Sync {
    // --- LEADS ---
    async fn list_leads(&self, scope: &LeadScope, filter: LeadFilter)
        -> Result<Vec<Lead>, AppError>;

    async fn find_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn insert_lead(&self, organization_id: Uuid, fields: &LeadFields)
        -> Result<Lead, AppError>;

    async fn update_lead(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        fields: &LeadFields,
    ) -> Result<Option<Lead>, AppError>;

    async fn delete_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<bool, AppError>;

    async fn set_lead_agent(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError>;

    async fn set_lead_category(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError>;

    // --- AGENTES ---
    async fn list_agents(&self, organization_id: Uuid) -> Result<Vec<AgentDetail>, AppError>;

    async fn find_agent(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Option<AgentDetail>, AppError>;

    /// Usuário (is_agent=true, is_organizer=false) + linha em `agents`,
    /// atomicamente.
    async fn create_agent_account(
        &self,
        organization_id: Uuid,
        new_user: NewUser,
    ) -> Result<AgentDetail, AppError>;

    async fn update_agent_profile(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
        profile: &AgentProfile,
    ) -> Result<Option<AgentDetail>, AppError>;

    /// Leads do agente ficam com `agent_id = NULL`.
    async fn delete_agent(&self, organization_id: Uuid, agent_id: Uuid) -> Result<bool, AppError>;

    // --- CATEGORIAS ---
    async fn list_categories(&self, organization_id: Uuid) -> Result<Vec<Category>, AppError>;

    async fn find_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError>;

    async fn insert_category(&self, organization_id: Uuid, name: &str)
        -> Result<Category, AppError>;

    async fn rename_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError>;

    /// Leads da categoria ficam com `category_id = NULL`.
    async fn delete_category(&self, organization_id: Uuid, category_id: Uuid)
        -> Result<bool, AppError>;
}
