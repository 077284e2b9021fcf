// src/services/lead_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        crm::{Lead, LeadFields, LeadFilter, LeadListing},
        principal::Principal,
    },
    services::notifier::Notifier,
};

#[derive(Clone)]
pub struct LeadService {
    crm: Arc<dyn CrmStore>,
    notifier: Notifier,
}

impl LeadService {
    pub fn new(crm: Arc<dyn CrmStore>, notifier: Notifier) -> Self {
        Self { crm, notifier }
    }

    // =========================================================================
    //  LEITURA (sempre pelo escopo do principal)
    // =========================================================================

    /// Lista principal + "leads sem agente" (só para organizadores).
    pub async fn list_leads(&self, principal: &Principal) -> Result<LeadListing, AppError> {
        let scope = principal.lead_scope();
        let leads = self.crm.list_leads(&scope, LeadFilter::All).await?;

        let unassigned_leads = if principal.is_organizer() {
            Some(self.crm.list_leads(&scope, LeadFilter::Unassigned).await?)
        } else {
            None
        };

        Ok(LeadListing {
            leads,
            unassigned_leads,
        })
    }

    pub async fn get_lead(&self, principal: &Principal, lead_id: Uuid) -> Result<Lead, AppError> {
        self.crm
            .find_lead(&principal.lead_scope(), lead_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    pub async fn create_lead(
        &self,
        principal: &Principal,
        fields: LeadFields,
    ) -> Result<Lead, AppError> {
        // A organização vem do principal, nunca do payload
        let organization_id = principal.require_organizer()?;
        self.ensure_references(organization_id, &fields).await?;

        let lead = self.crm.insert_lead(organization_id, &fields).await?;

        tracing::info!(
            lead_id = %lead.id,
            %organization_id,
            created_by = %principal.user_id(),
            "📇 Lead criado"
        );

        self.notifier.lead_created(&lead).await;
        Ok(lead)
    }

    pub async fn update_lead(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        fields: LeadFields,
    ) -> Result<Lead, AppError> {
        let organization_id = principal.require_organizer()?;
        self.ensure_references(organization_id, &fields).await?;

        self.crm
            .update_lead(&principal.lead_scope(), lead_id, &fields)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_lead(&self, principal: &Principal, lead_id: Uuid) -> Result<(), AppError> {
        principal.require_organizer()?;

        if !self.crm.delete_lead(&principal.lead_scope(), lead_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn assign_agent(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Lead, AppError> {
        let organization_id = principal.require_organizer()?;

        // Agente de outra organização é "não encontrado", e o lead fica intacto
        self.crm
            .find_agent(organization_id, agent_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.crm
            .set_lead_agent(&principal.lead_scope(), lead_id, Some(agent_id))
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Disponível para os dois papéis; o agente só alcança os leads dele.
    pub async fn update_lead_category(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Lead, AppError> {
        if let Some(category_id) = category_id {
            self.crm
                .find_category(principal.organization_id(), category_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        self.crm
            .set_lead_category(&principal.lead_scope(), lead_id, category_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    // Agente e categoria referenciados precisam ser da mesma organização
    async fn ensure_references(
        &self,
        organization_id: Uuid,
        fields: &LeadFields,
    ) -> Result<(), AppError> {
        if let Some(agent_id) = fields.agent_id {
            self.crm
                .find_agent(organization_id, agent_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }
        if let Some(category_id) = fields.category_id {
            self.crm
                .find_category(organization_id, category_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }
        Ok(())
    }
}
