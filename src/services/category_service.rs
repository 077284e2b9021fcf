// src/services/category_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        crm::{Category, CategoryDetail, CategoryListing, LeadFilter},
        principal::Principal,
    },
};

#[derive(Clone)]
pub struct CategoryService {
    crm: Arc<dyn CrmStore>,
}

impl CategoryService {
    pub fn new(crm: Arc<dyn CrmStore>) -> Self {
        Self { crm }
    }

    /// Categorias da organização (os dois papéis enxergam todas) e a contagem
    /// de leads sem categoria dentro do escopo de leads de quem pergunta.
    pub async fn list_categories(&self, principal: &Principal) -> Result<CategoryListing, AppError> {
        let categories = self.crm.list_categories(principal.organization_id()).await?;
        let uncategorized = self
            .crm
            .list_leads(&principal.lead_scope(), LeadFilter::Uncategorized)
            .await?;

        Ok(CategoryListing {
            categories,
            unassigned_lead_count: uncategorized.len(),
        })
    }

    pub async fn get_category(
        &self,
        principal: &Principal,
        category_id: Uuid,
    ) -> Result<CategoryDetail, AppError> {
        let category = self
            .crm
            .find_category(principal.organization_id(), category_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // Agente vê a categoria inteira, mas só os leads dele dentro dela
        let leads = self
            .crm
            .list_leads(&principal.lead_scope(), LeadFilter::InCategory(category_id))
            .await?;

        Ok(CategoryDetail { category, leads })
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<Category, AppError> {
        let organization_id = principal.require_organizer()?;
        self.crm.insert_category(organization_id, name).await
    }

    pub async fn rename_category(
        &self,
        principal: &Principal,
        category_id: Uuid,
        name: &str,
    ) -> Result<Category, AppError> {
        let organization_id = principal.require_organizer()?;
        self.crm
            .rename_category(organization_id, category_id, name)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Apaga a categoria; os leads dela ficam sem categoria.
    pub async fn delete_category(
        &self,
        principal: &Principal,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        let organization_id = principal.require_organizer()?;
        if !self.crm.delete_category(organization_id, category_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
