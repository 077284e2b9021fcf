// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::assign_agent,
        handlers::leads::update_lead_category,

        // --- Agents ---
        handlers::agents::list_agents,
        handlers::agents::create_agent,
        handlers::agents::get_agent,
        handlers::agents::update_agent,
        handlers::agents::delete_agent,

        // --- Categories ---
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::categories::rename_category,
        handlers::categories::delete_category,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- CRM ---
            models::crm::Organization,
            models::crm::Agent,
            models::crm::AgentDetail,
            models::crm::Category,
            models::crm::Lead,
            models::crm::LeadListing,
            models::crm::CategoryListing,
            models::crm::CategoryDetail,

            // --- Payloads ---
            handlers::leads::LeadPayload,
            handlers::leads::AssignAgentPayload,
            handlers::leads::LeadCategoryPayload,
            handlers::agents::AgentPayload,
            handlers::categories::CategoryPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Leads", description = "Contatos de vendas da organização"),
        (name = "Agents", description = "Equipe de vendas (apenas organizadores)"),
        (name = "Categories", description = "Etapas do funil")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
