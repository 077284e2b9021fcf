// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{CrmRepository, CrmStore, UserRepository, UserStore},
    services::{
        access::AccessService,
        agent_service::AgentService,
        auth::AuthService,
        category_service::CategoryService,
        lead_service::LeadService,
        notifier::{LogMailer, MailSettings, Notifier},
    },
};

// Tudo que vem do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub bind_addr: String,
    pub mail: MailSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de `from_env` para poder testar sem mexer no ambiente do processo
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{} deve ser definida", key));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", 24 * 7)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            mail: MailSettings {
                from_address: lookup("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|| "admin@leadflow.local".to_string()),
                lead_notification_recipient: lookup("LEAD_NOTIFICATION_RECIPIENT")
                    .unwrap_or_else(|| "ops@leadflow.local".to_string()),
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} inválida: '{}'", key, raw)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub access_service: AccessService,
    pub lead_service: LeadService,
    pub agent_service: AgentService,
    pub category_service: CategoryService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = Arc::new(I18nStore::load()?);

        // --- Monta o gráfico de dependências ---
        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db_pool.clone()));
        let crm: Arc<dyn CrmStore> = Arc::new(CrmRepository::new(db_pool.clone()));
        let notifier = Notifier::new(Arc::new(LogMailer), config.mail.clone());

        let auth_service = AuthService::new(
            users.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
            config.bcrypt_cost,
        );
        let access_service = AccessService::new(users);
        let lead_service = LeadService::new(crm.clone(), notifier.clone());
        let agent_service = AgentService::new(crm.clone(), notifier, config.bcrypt_cost);
        let category_service = CategoryService::new(crm);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            access_service,
            lead_service,
            agent_service,
            category_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/leadflow"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.jwt_ttl_hours, 168);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.mail.lead_notification_recipient, "ops@leadflow.local");
    }

    #[test]
    fn missing_required_var_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/leadflow"),
            ("JWT_SECRET", "s3cret"),
            ("BCRYPT_COST", "muito"),
        ]));
        assert!(result.is_err());
    }
}
