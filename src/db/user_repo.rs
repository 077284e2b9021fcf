// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::UserStore,
    models::{
        auth::{NewUser, User},
        crm::{Agent, Organization},
    },
};

// O repositório de usuários: tabelas 'users', 'organizations' e a ponta 'agents' da resolução de papel
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // INSERT genérico no executor: serve tanto para o organizador quanto
    // para o usuário do agente (dentro da transação de `create_agent_account`).
    pub(crate) async fn insert_user<'e, E>(
        executor: E,
        new_user: &NewUser,
        is_organizer: bool,
        is_agent: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, email, password_hash, first_name, last_name,
                is_organizer, is_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(is_organizer)
        .bind(is_agent)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }
}

/// Converte violação de chave única em um erro mais amigável.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                // Nomes padrão que o Postgres cria para UNIQUE nas colunas
                Some("users_email_key") => return AppError::EmailAlreadyExists,
                Some("users_username_key") => return AppError::UsernameAlreadyExists,
                _ => {}
            }
        }
    }
    e.into()
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    async fn create_organizer(&self, new_user: NewUser) -> Result<(User, Organization), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = Self::insert_user(&mut *tx, &new_user, true, false).await?;

        // O "perfil" da organização nasce junto; se falhar, o usuário acima é desfeito
        let organization = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (owner_id) VALUES ($1) RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, organization))
    }

    async fn find_organization_by_owner(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE owner_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(organization)
    }

    async fn find_agent_by_user(&self, user_id: Uuid) -> Result<Option<Agent>, AppError> {
        let agent = sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }
}
