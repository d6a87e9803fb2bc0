// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PerfilRepository, UserRepository},
    models::{
        auth::{Claims, User},
        perfil::TipoUsuario,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    perfil_repo: PerfilRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        perfil_repo: PerfilRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            perfil_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        tipo: TipoUsuario,
        coordenacao_id: Option<Uuid>,
    ) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, pois não toca no banco)
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Usuário + perfil nascem na mesma transação: ou os dois, ou nenhum.
        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(&mut *tx, email, &hashed_password, false, false)
            .await?;

        self.perfil_repo
            .create_perfil(&mut *tx, new_user.id, tipo, coordenacao_id)
            .await?;

        // 3. Evento pós-gravação de usuário (mesma transação).
        self.garantir_perfil_admin(&mut *tx, &new_user).await?;

        tx.commit().await?;

        // 4. Gera o token (não precisa de transação de banco)
        self.create_token(new_user.id)
    }

    /// Evento pós-gravação de usuário: uma conta privilegiada sempre sai
    /// daqui com perfil admin, corrigindo qualquer perfil divergente.
    /// Upsert idempotente: rodar de novo dá no mesmo.
    pub async fn garantir_perfil_admin<'e, E>(
        &self,
        executor: E,
        user: &User,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if user.is_superuser || user.is_staff {
            self.perfil_repo
                .ensure_admin_perfil(executor, user.id)
                .await?;
        }
        Ok(())
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
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
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

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
