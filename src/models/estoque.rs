// src/models/estoque.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// --- Cadastros de referência ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordenacao {
    pub id: Uuid,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Controlador {
    pub id: Uuid,
    pub nome: String,
}

// --- Reagente ---
// data_entrada é carimbada pelo banco na criação e nunca muda.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reagente {
    pub id: Uuid,
    pub nome: String,
    pub fispq: String,
    pub controlador_id: Uuid,
    pub armario: String,
    pub validade: NaiveDate,
    pub data_entrada: DateTime<Utc>,
    pub nota_fiscal: Option<String>,
    pub ativo: bool,
}

// --- Alocação ---
// O contador de saldo de um par (reagente, coordenação). Só a operação de
// saída mexe na quantidade depois do registro.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReagenteCoordenacao {
    pub id: Uuid,
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub quantidade: i32,
}

// --- Saída ---
// Registro imutável de auditoria; data_saida vem do relógio do servidor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaidaReagente {
    pub id: Uuid,
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub requisitante: String,
    pub quantidade: i32,
    pub data_saida: DateTime<Utc>,
    pub observacao: Option<String>,
}

// --- Situação da validade ---
// Derivada da data de validade e do dia corrente; nunca persistida.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusValidade {
    Vencido,
    Alerta,
    #[default]
    Ok,
}

impl StatusValidade {
    /// Vencido antes de hoje; em alerta até um ano à frente; ok depois disso.
    pub fn calcular(validade: NaiveDate, hoje: NaiveDate) -> Self {
        if validade < hoje {
            StatusValidade::Vencido
        } else if validade <= hoje + Duration::days(365) {
            StatusValidade::Alerta
        } else {
            StatusValidade::Ok
        }
    }
}

// --- Linhas de listagem (JOIN com reagente/controlador/coordenação) ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaEstoque {
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub reagente_nome: String,
    pub fispq: String,
    pub controlador_nome: String,
    pub armario: String,
    pub validade: NaiveDate,
    pub coordenacao_nome: String,
    pub quantidade: i32,
    #[sqlx(skip)]
    pub status_validade: StatusValidade,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaHistorico {
    pub saida_id: Uuid,
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub reagente_nome: String,
    pub fispq: String,
    pub controlador_nome: String,
    pub coordenacao_nome: String,
    pub requisitante: String,
    pub quantidade: i32,
    pub data_saida: DateTime<Utc>,
    pub observacao: Option<String>,
    pub validade: NaiveDate,
}

// --- Relatório gerencial ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoCoordenacao {
    pub coordenacao_id: Uuid,
    pub coordenacao_nome: String,
    pub itens: i64,
    pub quantidade_total: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relatorio {
    pub coordenacoes: Vec<ResumoCoordenacao>,
    pub reagentes_vencidos: i64,
    pub reagentes_em_alerta: i64,
    pub total_saidas: i64,
}
