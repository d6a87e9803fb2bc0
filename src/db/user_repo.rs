// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        is_superuser: bool,
        is_staff: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (email, password_hash, is_superuser, is_staff)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(is_superuser)
        .bind(is_staff)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }
}
