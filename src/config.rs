// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::fold::AccentFolder,
    db::{EstoqueRepository, PerfilRepository, UserRepository},
    services::{auth::AuthService, estoque::EstoqueService, perfil::PerfilService},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub perfil_service: PerfilService,
    pub estoque_service: EstoqueService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // Capacidade de dobra de acentos, sondada uma única vez na subida.
        let folder = AccentFolder::detect(&db_pool).await?;

        // --- Monta o grafo de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let perfil_repo = PerfilRepository::new(db_pool.clone());
        let estoque_repo = EstoqueRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            perfil_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let perfil_service = PerfilService::new(perfil_repo);
        let estoque_service = EstoqueService::new(estoque_repo, folder, db_pool.clone());

        Ok(Self {
            db_pool,
            auth_service,
            perfil_service,
            estoque_service,
        })
    }
}
