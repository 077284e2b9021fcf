// src/db/crm_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        store::CrmStore,
        user_repo::{map_unique_violation, UserRepository},
    },
    models::{
        auth::NewUser,
        crm::{AgentDetail, AgentProfile, Category, Lead, LeadFields, LeadFilter},
        principal::LeadScope,
    },
};

// Filtro de escopo compartilhado por todas as queries de lead.
// $1 = organização, $2 = agente (NULL para organizador)
const LEAD_SCOPE: &str = "organization_id = $1 AND ($2::uuid IS NULL OR agent_id = $2)";

const AGENT_DETAIL_SELECT: &str = r#"
    SELECT
        a.id, a.user_id, a.organization_id,
        u.username, u.email, u.first_name, u.last_name,
        a.created_at
    FROM agents a
    INNER JOIN users u ON u.id = a.user_id
"#;

/// O agente/categoria referenciado sumiu entre a checagem do serviço e a escrita:
/// para quem chamou é o mesmo que nunca ter existido.
fn map_missing_reference(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound;
        }
    }
    e.into()
}

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrmStore for CrmRepository {
    // =========================================================================
    //  LEADS
    // =========================================================================

    async fn list_leads(
        &self,
        scope: &LeadScope,
        filter: LeadFilter,
    ) -> Result<Vec<Lead>, AppError> {
        let extra = match filter {
            LeadFilter::All => "",
            LeadFilter::Unassigned => "AND agent_id IS NULL",
            LeadFilter::Uncategorized => "AND category_id IS NULL",
            LeadFilter::InCategory(_) => "AND category_id = $3",
        };
        let sql = format!(
            "SELECT * FROM leads WHERE {} {} ORDER BY date_added ASC",
            LEAD_SCOPE, extra
        );

        let mut query = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id);
        if let LeadFilter::InCategory(category_id) = filter {
            query = query.bind(category_id);
        }

        let leads = query.fetch_all(&self.pool).await?;
        Ok(leads)
    }

    async fn find_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let sql = format!("SELECT * FROM leads WHERE {} AND id = $3", LEAD_SCOPE);
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id)
            .bind(lead_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn insert_lead(
        &self,
        organization_id: Uuid,
        fields: &LeadFields,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                organization_id, agent_id, category_id,
                first_name, last_name, age, phone_number, email, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(fields.agent_id)
        .bind(fields.category_id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.age)
        .bind(&fields.phone_number)
        .bind(&fields.email)
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_missing_reference)?;
        Ok(lead)
    }

    async fn update_lead(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        fields: &LeadFields,
    ) -> Result<Option<Lead>, AppError> {
        // date_added e organization_id nunca entram no SET
        let sql = format!(
            r#"
            UPDATE leads SET
                agent_id = $4, category_id = $5,
                first_name = $6, last_name = $7, age = $8,
                phone_number = $9, email = $10, description = $11
            WHERE {} AND id = $3
            RETURNING *
            "#,
            LEAD_SCOPE
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id)
            .bind(lead_id)
            .bind(fields.agent_id)
            .bind(fields.category_id)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(fields.age)
            .bind(&fields.phone_number)
            .bind(&fields.email)
            .bind(&fields.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_missing_reference)?;
        Ok(lead)
    }

    async fn delete_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM leads WHERE {} AND id = $3", LEAD_SCOPE);
        let result = sqlx::query(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id)
            .bind(lead_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_lead_agent(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError> {
        let sql = format!(
            "UPDATE leads SET agent_id = $4 WHERE {} AND id = $3 RETURNING *",
            LEAD_SCOPE
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id)
            .bind(lead_id)
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_missing_reference)?;
        Ok(lead)
    }

    async fn set_lead_category(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError> {
        let sql = format!(
            "UPDATE leads SET category_id = $4 WHERE {} AND id = $3 RETURNING *",
            LEAD_SCOPE
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope.organization_id)
            .bind(scope.agent_id)
            .bind(lead_id)
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_missing_reference)?;
        Ok(lead)
    }

    // =========================================================================
    //  AGENTES
    // =========================================================================

    async fn list_agents(&self, organization_id: Uuid) -> Result<Vec<AgentDetail>, AppError> {
        let sql = format!(
            "{} WHERE a.organization_id = $1 ORDER BY a.created_at ASC",
            AGENT_DETAIL_SELECT
        );
        let agents = sqlx::query_as::<_, AgentDetail>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(agents)
    }

    async fn find_agent(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Option<AgentDetail>, AppError> {
        let sql = format!(
            "{} WHERE a.organization_id = $1 AND a.id = $2",
            AGENT_DETAIL_SELECT
        );
        let agent = sqlx::query_as::<_, AgentDetail>(&sql)
            .bind(organization_id)
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    async fn create_agent_account(
        &self,
        organization_id: Uuid,
        new_user: NewUser,
    ) -> Result<AgentDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. O usuário do agente (nunca organizador)
        let user = UserRepository::insert_user(&mut *tx, &new_user, false, true).await?;

        // 2. A linha do agente; se falhar, o usuário acima sofre rollback no drop do tx
        let (agent_id, created_at): (Uuid, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
            r#"
            INSERT INTO agents (user_id, organization_id)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(user.id)
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AgentDetail {
            id: agent_id,
            user_id: user.id,
            organization_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at,
        })
    }

    async fn update_agent_profile(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
        profile: &AgentProfile,
    ) -> Result<Option<AgentDetail>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = $3, email = $4, first_name = $5, last_name = $6,
                updated_at = NOW()
            WHERE id = (
                SELECT user_id FROM agents WHERE id = $1 AND organization_id = $2
            )
            "#,
        )
        .bind(agent_id)
        .bind(organization_id)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_agent(organization_id, agent_id).await
    }

    async fn delete_agent(&self, organization_id: Uuid, agent_id: Uuid) -> Result<bool, AppError> {
        // O ON DELETE SET NULL de leads.agent_id desvincula os leads
        let result = sqlx::query("DELETE FROM agents WHERE id = $1 AND organization_id = $2")
            .bind(agent_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    async fn list_categories(&self, organization_id: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE organization_id = $1 ORDER BY created_at ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_category(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (organization_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(organization_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn rename_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $3 WHERE organization_id = $1 AND id = $2 RETURNING *",
        )
        .bind(organization_id)
        .bind(category_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
    ) -> Result<bool, AppError> {
        // O ON DELETE SET NULL de leads.category_id desvincula os leads
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND organization_id = $2")
            .bind(category_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
