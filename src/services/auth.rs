// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{Claims, NewUser, User},
};

/// Hash bcrypt fora do executor assíncrono (é CPU pesado).
pub(crate) async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_secret: String,
        token_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
        }
    }

    /// Cadastro público: quem cria a conta é organizador e ganha a própria organização.
    pub async fn register_organizer(
        &self,
        username: &str,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, AppError> {
        let password_hash = hash_password(password.to_owned(), self.bcrypt_cost).await?;

        let (user, organization) = self
            .users
            .create_organizer(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            organization_id = %organization.id,
            "🏢 Novo organizador cadastrado"
        );

        self.create_token(user.id)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;

    #[tokio::test]
    async fn register_creates_organizer_with_organization() {
        let h = Harness::new();
        let token = h
            .auth
            .register_organizer("ana", "ana@test.local", "secret123", "Ana", "Lima")
            .await
            .unwrap();

        let user = h.auth.validate_token(&token).await.unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.is_organizer);
        assert!(!user.is_agent);
        assert_ne!(user.password_hash, "secret123");

        let principal = h.access.resolve(&user).await.unwrap();
        assert!(principal.is_organizer());
    }

    #[tokio::test]
    async fn login_checks_password() {
        let h = Harness::new();
        h.auth
            .register_organizer("ana", "ana@test.local", "secret123", "", "")
            .await
            .unwrap();

        assert!(h.auth.login_user("ana", "secret123").await.is_ok());
        assert!(matches!(
            h.auth.login_user("ana", "wrong-pass").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            h.auth.login_user("nobody", "secret123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let h = Harness::new();
        h.auth
            .register_organizer("ana", "ana@test.local", "secret123", "", "")
            .await
            .unwrap();

        let again = h
            .auth
            .register_organizer("ana", "other@test.local", "secret123", "", "")
            .await;
        assert!(matches!(again, Err(AppError::UsernameAlreadyExists)));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let h = Harness::new();
        assert!(matches!(
            h.auth.validate_token("not-a-jwt").await,
            Err(AppError::InvalidToken)
        ));
    }
}
