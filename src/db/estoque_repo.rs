// src/db/estoque_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::estoque::{
        Controlador, Coordenacao, LinhaEstoque, LinhaHistorico, Reagente, ReagenteCoordenacao,
        ResumoCoordenacao, SaidaReagente,
    },
};

#[derive(Clone)]
pub struct EstoqueRepository {
    pool: PgPool,
}

impl EstoqueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Cadastros de referência (coordenações e controladores)
    // ---

    pub async fn get_all_coordenacoes(&self) -> Result<Vec<Coordenacao>, AppError> {
        let coordenacoes =
            sqlx::query_as::<_, Coordenacao>("SELECT * FROM coordenacoes ORDER BY nome ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(coordenacoes)
    }

    pub async fn create_coordenacao(&self, nome: &str) -> Result<Coordenacao, AppError> {
        let coordenacao = sqlx::query_as::<_, Coordenacao>(
            "INSERT INTO coordenacoes (nome) VALUES ($1) RETURNING *",
        )
        .bind(nome)
        .fetch_one(&self.pool)
        .await?;
        Ok(coordenacao)
    }

    // Proteção contra remoção: uma coordenação referenciada por alocações,
    // saídas ou perfis não sai do banco.
    pub async fn delete_coordenacao(&self, id: Uuid) -> Result<u64, AppError> {
        let resultado = sqlx::query("DELETE FROM coordenacoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ConstraintViolation(
                            "Coordenação em uso não pode ser removida.".to_string(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(resultado.rows_affected())
    }

    pub async fn get_all_controladores(&self) -> Result<Vec<Controlador>, AppError> {
        let controladores =
            sqlx::query_as::<_, Controlador>("SELECT * FROM controladores ORDER BY nome ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(controladores)
    }

    pub async fn create_controlador(&self, nome: &str) -> Result<Controlador, AppError> {
        let controlador = sqlx::query_as::<_, Controlador>(
            "INSERT INTO controladores (nome) VALUES ($1) RETURNING *",
        )
        .bind(nome)
        .fetch_one(&self.pool)
        .await?;
        Ok(controlador)
    }

    pub async fn delete_controlador(&self, id: Uuid) -> Result<u64, AppError> {
        let resultado = sqlx::query("DELETE FROM controladores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ConstraintViolation(
                            "Controlador em uso não pode ser removido.".to_string(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(resultado.rows_affected())
    }

    // ---
    // Reagentes e alocações (escritas transacionais via Executor)
    // ---

    pub async fn find_reagente<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Reagente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reagente = sqlx::query_as::<_, Reagente>("SELECT * FROM reagentes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(reagente)
    }

    pub async fn create_reagente<'e, E>(
        &self,
        executor: E,
        nome: &str,
        fispq: &str,
        controlador_id: Uuid,
        armario: &str,
        validade: NaiveDate,
        nota_fiscal: Option<&str>,
    ) -> Result<Reagente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Reagente>(
            r#"
            INSERT INTO reagentes (nome, fispq, controlador_id, armario, validade, nota_fiscal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(fispq)
        .bind(controlador_id)
        .bind(armario)
        .bind(validade)
        .bind(nota_fiscal)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Controlador");
                }
            }
            e.into()
        })
    }

    pub async fn create_alocacao<'e, E>(
        &self,
        executor: E,
        reagente_id: Uuid,
        coordenacao_id: Uuid,
        quantidade: i32,
    ) -> Result<ReagenteCoordenacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReagenteCoordenacao>(
            r#"
            INSERT INTO reagente_coordenacao (reagente_id, coordenacao_id, quantidade)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(reagente_id)
        .bind(coordenacao_id)
        .bind(quantidade)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ConstraintViolation(
                        "Já existe alocação deste reagente para esta coordenação.".to_string(),
                    );
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Coordenação");
                }
            }
            e.into()
        })
    }

    /// Trava a linha de saldo do par (reagente, coordenação) até o commit.
    /// Saídas concorrentes sobre o mesmo par serializam aqui.
    pub async fn get_alocacao_for_update<'e, E>(
        &self,
        executor: E,
        reagente_id: Uuid,
        coordenacao_id: Uuid,
    ) -> Result<Option<ReagenteCoordenacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alocacao = sqlx::query_as::<_, ReagenteCoordenacao>(
            r#"
            SELECT * FROM reagente_coordenacao
            WHERE reagente_id = $1 AND coordenacao_id = $2
            FOR UPDATE
            "#,
        )
        .bind(reagente_id)
        .bind(coordenacao_id)
        .fetch_optional(executor)
        .await?;
        Ok(alocacao)
    }

    pub async fn decrement_alocacao<'e, E>(
        &self,
        executor: E,
        alocacao_id: Uuid,
        quantidade: i32,
    ) -> Result<ReagenteCoordenacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReagenteCoordenacao>(
            r#"
            UPDATE reagente_coordenacao
            SET quantidade = quantidade - $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(alocacao_id)
        .bind(quantidade)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // CHECK (quantidade >= 0): o saldo não cobria o pedido.
                if db_err.is_check_violation() {
                    return AppError::InsufficientStock;
                }
            }
            e.into()
        })
    }

    pub async fn create_saida<'e, E>(
        &self,
        executor: E,
        reagente_id: Uuid,
        coordenacao_id: Uuid,
        requisitante: &str,
        quantidade: i32,
        observacao: Option<&str>,
    ) -> Result<SaidaReagente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saida = sqlx::query_as::<_, SaidaReagente>(
            r#"
            INSERT INTO saidas_reagente (reagente_id, coordenacao_id, requisitante, quantidade, observacao)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(reagente_id)
        .bind(coordenacao_id)
        .bind(requisitante)
        .bind(quantidade)
        .bind(observacao)
        .fetch_one(executor)
        .await?;
        Ok(saida)
    }

    // ---
    // Listagens
    // ---

    // Saldos zerados ficam fora da vista de estoque, mas permanecem no banco.
    pub async fn list_estoque(
        &self,
        coordenacao_id: Option<Uuid>,
    ) -> Result<Vec<LinhaEstoque>, AppError> {
        let linhas = sqlx::query_as::<_, LinhaEstoque>(
            r#"
            SELECT rc.reagente_id, rc.coordenacao_id, r.nome AS reagente_nome, r.fispq,
                   ct.nome AS controlador_nome, r.armario, r.validade,
                   c.nome AS coordenacao_nome, rc.quantidade
            FROM reagente_coordenacao rc
            JOIN reagentes r ON r.id = rc.reagente_id
            JOIN controladores ct ON ct.id = r.controlador_id
            JOIN coordenacoes c ON c.id = rc.coordenacao_id
            WHERE rc.quantidade > 0
              AND ($1::uuid IS NULL OR rc.coordenacao_id = $1)
            "#,
        )
        .bind(coordenacao_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    pub async fn list_historico(
        &self,
        coordenacao_id: Option<Uuid>,
    ) -> Result<Vec<LinhaHistorico>, AppError> {
        let linhas = sqlx::query_as::<_, LinhaHistorico>(
            r#"
            SELECT s.id AS saida_id, s.reagente_id, s.coordenacao_id,
                   r.nome AS reagente_nome, r.fispq, ct.nome AS controlador_nome,
                   c.nome AS coordenacao_nome, s.requisitante, s.quantidade,
                   s.data_saida, s.observacao, r.validade
            FROM saidas_reagente s
            JOIN reagentes r ON r.id = s.reagente_id
            JOIN controladores ct ON ct.id = r.controlador_id
            JOIN coordenacoes c ON c.id = s.coordenacao_id
            WHERE ($1::uuid IS NULL OR s.coordenacao_id = $1)
            ORDER BY s.data_saida DESC
            "#,
        )
        .bind(coordenacao_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    // ---
    // Relatório
    // ---

    pub async fn resumo_por_coordenacao(&self) -> Result<Vec<ResumoCoordenacao>, AppError> {
        let resumo = sqlx::query_as::<_, ResumoCoordenacao>(
            r#"
            SELECT c.id AS coordenacao_id, c.nome AS coordenacao_nome,
                   COUNT(rc.id) AS itens,
                   COALESCE(SUM(rc.quantidade), 0) AS quantidade_total
            FROM coordenacoes c
            LEFT JOIN reagente_coordenacao rc ON rc.coordenacao_id = c.id
            GROUP BY c.id, c.nome
            ORDER BY c.nome ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(resumo)
    }

    pub async fn contar_validade(
        &self,
        hoje: NaiveDate,
        limite_alerta: NaiveDate,
    ) -> Result<(i64, i64), AppError> {
        let contagem = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE validade < $1),
                   COUNT(*) FILTER (WHERE validade >= $1 AND validade <= $2)
            FROM reagentes
            "#,
        )
        .bind(hoje)
        .bind(limite_alerta)
        .fetch_one(&self.pool)
        .await?;
        Ok(contagem)
    }

    pub async fn contar_saidas(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saidas_reagente")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
