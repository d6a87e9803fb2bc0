// Apoio compartilhado pelos testes de integração (exigem Postgres via
// DATABASE_URL; o harness do sqlx cria um banco por teste e aplica as
// migrações de ./migrations).

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use estoque_reagentes::{
    common::fold::AccentFolder,
    db::EstoqueRepository,
    models::estoque::{Controlador, Coordenacao, Reagente},
    services::estoque::EstoqueService,
};

pub fn estoque_service(pool: &PgPool) -> EstoqueService {
    EstoqueService::new(
        EstoqueRepository::new(pool.clone()),
        AccentFolder::Nfd,
        pool.clone(),
    )
}

pub async fn criar_coordenacao(pool: &PgPool, nome: &str) -> Coordenacao {
    EstoqueRepository::new(pool.clone())
        .create_coordenacao(nome)
        .await
        .unwrap()
}

pub async fn criar_controlador(pool: &PgPool, nome: &str) -> Controlador {
    EstoqueRepository::new(pool.clone())
        .create_controlador(nome)
        .await
        .unwrap()
}

pub async fn criar_reagente(
    pool: &PgPool,
    controlador_id: Uuid,
    nome: &str,
    fispq: &str,
    validade: NaiveDate,
) -> Reagente {
    EstoqueRepository::new(pool.clone())
        .create_reagente(pool, nome, fispq, controlador_id, "A1", validade, None)
        .await
        .unwrap()
}

pub async fn alocar(pool: &PgPool, reagente_id: Uuid, coordenacao_id: Uuid, quantidade: i32) {
    EstoqueRepository::new(pool.clone())
        .create_alocacao(pool, reagente_id, coordenacao_id, quantidade)
        .await
        .unwrap();
}

pub struct Cenario {
    pub reagente_id: Uuid,
    pub coordenacao: Coordenacao,
    pub controlador_id: Uuid,
}

/// Controlador + coordenação + um reagente já alocado com o saldo dado.
pub async fn semear_estoque(pool: &PgPool, nome_reagente: &str, quantidade: i32) -> Cenario {
    let controlador = criar_controlador(pool, "Controlador X").await;
    let coordenacao = criar_coordenacao(pool, "Coord A").await;
    let reagente = criar_reagente(
        pool,
        controlador.id,
        nome_reagente,
        "F-001",
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
    )
    .await;
    alocar(pool, reagente.id, coordenacao.id, quantidade).await;

    Cenario {
        reagente_id: reagente.id,
        coordenacao,
        controlador_id: controlador.id,
    }
}

pub async fn quantidade_alocada(pool: &PgPool, reagente_id: Uuid, coordenacao_id: Uuid) -> i32 {
    sqlx::query_scalar(
        "SELECT quantidade FROM reagente_coordenacao WHERE reagente_id = $1 AND coordenacao_id = $2",
    )
    .bind(reagente_id)
    .bind(coordenacao_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn total_saidas(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM saidas_reagente")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn total_reagentes(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM reagentes")
        .fetch_one(pool)
        .await
        .unwrap()
}
