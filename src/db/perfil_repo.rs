// src/db/perfil_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::perfil::{Perfil, PerfilComCoordenacao, TipoUsuario},
};

#[derive(Clone)]
pub struct PerfilRepository {
    pool: PgPool,
}

impl PerfilRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca o perfil de um usuário com a coordenação já resolvida.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<PerfilComCoordenacao>, AppError> {
        let perfil = sqlx::query_as::<_, PerfilComCoordenacao>(
            r#"
            SELECT p.tipo, p.coordenacao_id, c.nome AS coordenacao_nome
            FROM perfis p
            LEFT JOIN coordenacoes c ON c.id = p.coordenacao_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(perfil)
    }

    // Cria um perfil. A restrição CHECK do banco rejeita admin com
    // coordenação e coord sem coordenação, mesmo que a aplicação erre.
    pub async fn create_perfil<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        tipo: TipoUsuario,
        coordenacao_id: Option<Uuid>,
    ) -> Result<Perfil, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Perfil>(
            r#"
            INSERT INTO perfis (user_id, tipo, coordenacao_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tipo)
        .bind(coordenacao_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ConstraintViolation(
                        "Este usuário já possui um perfil.".to_string(),
                    );
                }
                if db_err.is_check_violation() {
                    return AppError::ConstraintViolation(
                        "Perfil inconsistente com a coordenação informada.".to_string(),
                    );
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Coordenação");
                }
            }
            e.into()
        })
    }

    /// Upsert idempotente: contas privilegiadas sempre materializam um
    /// perfil admin, e um perfil divergente é corrigido para admin sem
    /// coordenação.
    pub async fn ensure_admin_perfil<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Perfil, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let perfil = sqlx::query_as::<_, Perfil>(
            r#"
            INSERT INTO perfis (user_id, tipo, coordenacao_id)
            VALUES ($1, 'admin', NULL)
            ON CONFLICT (user_id)
            DO UPDATE SET tipo = 'admin', coordenacao_id = NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(perfil)
    }
}
