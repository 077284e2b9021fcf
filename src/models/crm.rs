// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ORGANIZAÇÃO (A fronteira de tenancy) ---

// Nasce junto com o organizador, na mesma transação do cadastro
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- AGENTE ---

// A linha crua da tabela `agents`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Agente + dados do usuário que ele embrulha (JOIN com `users`)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

// Campos editáveis do usuário de um agente
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// --- CATEGORIA (Etapa do funil) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Contacted")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// --- LEAD (O contato de vendas) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub category_id: Option<Uuid>,

    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub phone_number: String,
    pub email: String,
    pub description: String,

    // Gravado no INSERT e nunca mais alterado
    pub date_added: DateTime<Utc>,
}

// Os campos que o organizador controla em um lead.
// A organização NUNCA vem daqui: é sempre a do principal.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadFields {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub phone_number: String,
    pub email: String,
    pub description: String,
    pub agent_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

/// Recorte adicional aplicado sobre o escopo de leads do principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadFilter {
    All,
    Unassigned,
    Uncategorized,
    InCategory(Uuid),
}

#[cfg(test)]
impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        match self {
            LeadFilter::All => true,
            LeadFilter::Unassigned => lead.agent_id.is_none(),
            LeadFilter::Uncategorized => lead.category_id.is_none(),
            LeadFilter::InCategory(id) => lead.category_id == Some(*id),
        }
    }
}

// --- RESPOSTAS COMPOSTAS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadListing {
    pub leads: Vec<Lead>,

    // Só existe para organizadores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unassigned_leads: Option<Vec<Lead>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub categories: Vec<Category>,
    pub unassigned_lead_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    pub category: Category,
    pub leads: Vec<Lead>,
}
