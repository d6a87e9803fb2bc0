// src/handlers/estoque.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::CurrentRole,
    services::estoque::{FiltroListagem, NovaAlocacao, NovaSaida, NovoReagente},
};

// ---
// Payload: registro de reagente com as alocações por coordenação
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlocacaoPayload {
    pub coordenacao_id: Uuid,
    pub quantidade: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReagentePayload {
    pub nome: String,
    pub fispq: String,
    pub controlador_id: Uuid,
    pub armario: String,
    pub validade: NaiveDate,
    pub nota_fiscal: Option<String>,
    pub alocacoes: Vec<AlocacaoPayload>,
}

#[utoipa::path(
    post,
    path = "/api/estoque/reagentes",
    tag = "Estoque",
    security(("api_jwt" = [])),
    request_body = ReagentePayload,
    responses(
        (status = 201, description = "Reagente registrado"),
        (status = 400, description = "Campos inválidos"),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn create_reagente(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Json(payload): Json<ReagentePayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = NovoReagente {
        nome: payload.nome,
        fispq: payload.fispq,
        controlador_id: payload.controlador_id,
        armario: payload.armario,
        validade: payload.validade,
        nota_fiscal: payload.nota_fiscal,
        alocacoes: payload
            .alocacoes
            .into_iter()
            .map(|a| NovaAlocacao {
                coordenacao_id: a.coordenacao_id,
                quantidade: a.quantidade,
            })
            .collect(),
    };

    let reagente = app_state
        .estoque_service
        .register_reagente(&role, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(reagente)))
}

// ---
// Payload: saída de reagente
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaidaPayload {
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub requisitante: String,
    pub quantidade: i32,
    pub observacao: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/estoque/saidas",
    tag = "Estoque",
    security(("api_jwt" = [])),
    request_body = SaidaPayload,
    responses(
        (status = 201, description = "Saída registrada"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Reagente ou alocação inexistente"),
        (status = 422, description = "Quantidade insuficiente em estoque"),
    )
)]
pub async fn create_saida(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Json(payload): Json<SaidaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = NovaSaida {
        reagente_id: payload.reagente_id,
        coordenacao_id: payload.coordenacao_id,
        requisitante: payload.requisitante,
        quantidade: payload.quantidade,
        observacao: payload.observacao,
    };

    let saida = app_state.estoque_service.register_saida(&role, &input).await?;

    Ok((StatusCode::CREATED, Json(saida)))
}

// ---
// Listagens
// ---

#[derive(Debug, Deserialize, Default, IntoParams)]
pub struct ListagemParams {
    // Busca insensível a caixa e a acentos.
    pub search: Option<String>,
    // "validade" ou "nome"; outros valores são ignorados.
    pub ordenar: Option<String>,
    // Filtro por coordenação (só faz efeito para admin).
    pub coord: Option<Uuid>,
}

impl ListagemParams {
    fn into_filtro(self) -> FiltroListagem {
        FiltroListagem {
            search: self.search,
            ordenar: self.ordenar,
            coordenacao_id: self.coord,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/estoque",
    tag = "Estoque",
    security(("api_jwt" = [])),
    params(ListagemParams),
    responses((status = 200, description = "Estoque atual, escopado por papel"))
)]
pub async fn list_estoque(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Query(params): Query<ListagemParams>,
) -> Result<impl IntoResponse, AppError> {
    let linhas = app_state
        .estoque_service
        .list_estoque(&role, &params.into_filtro())
        .await?;
    Ok(Json(linhas))
}

#[utoipa::path(
    get,
    path = "/api/estoque/saidas",
    tag = "Estoque",
    security(("api_jwt" = [])),
    params(ListagemParams),
    responses((status = 200, description = "Histórico de saídas, escopado por papel"))
)]
pub async fn list_historico(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Query(params): Query<ListagemParams>,
) -> Result<impl IntoResponse, AppError> {
    let linhas = app_state
        .estoque_service
        .list_historico(&role, &params.into_filtro())
        .await?;
    Ok(Json(linhas))
}

// ---
// Relatório
// ---

#[utoipa::path(
    get,
    path = "/api/estoque/relatorio",
    tag = "Estoque",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Resumo por coordenação e validade"),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn get_relatorio(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
) -> Result<impl IntoResponse, AppError> {
    let relatorio = app_state.estoque_service.relatorio(&role).await?;
    Ok(Json(relatorio))
}

// ---
// Cadastros de referência
// ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCoordenacaoPayload {
    pub nome: String,
}

#[utoipa::path(
    get,
    path = "/api/coordenacoes",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Todas as coordenações"))
)]
pub async fn list_coordenacoes(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let coordenacoes = app_state.estoque_service.get_all_coordenacoes().await?;
    Ok(Json(coordenacoes))
}

#[utoipa::path(
    post,
    path = "/api/coordenacoes",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    request_body = CreateCoordenacaoPayload,
    responses(
        (status = 201, description = "Coordenação criada"),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn create_coordenacao(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Json(payload): Json<CreateCoordenacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let coordenacao = app_state
        .estoque_service
        .create_coordenacao(&role, &payload.nome)
        .await?;
    Ok((StatusCode::CREATED, Json(coordenacao)))
}

#[utoipa::path(
    delete,
    path = "/api/coordenacoes/{id}",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID da coordenação")),
    responses(
        (status = 204, description = "Coordenação removida"),
        (status = 409, description = "Coordenação em uso"),
    )
)]
pub async fn delete_coordenacao(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.estoque_service.delete_coordenacao(&role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateControladorPayload {
    pub nome: String,
}

#[utoipa::path(
    get,
    path = "/api/controladores",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Todos os controladores"))
)]
pub async fn list_controladores(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let controladores = app_state.estoque_service.get_all_controladores().await?;
    Ok(Json(controladores))
}

#[utoipa::path(
    post,
    path = "/api/controladores",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    request_body = CreateControladorPayload,
    responses(
        (status = 201, description = "Controlador criado"),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn create_controlador(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Json(payload): Json<CreateControladorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let controlador = app_state
        .estoque_service
        .create_controlador(&role, &payload.nome)
        .await?;
    Ok((StatusCode::CREATED, Json(controlador)))
}

#[utoipa::path(
    delete,
    path = "/api/controladores/{id}",
    tag = "Cadastros",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID do controlador")),
    responses(
        (status = 204, description = "Controlador removido"),
        (status = 409, description = "Controlador em uso"),
    )
)]
pub async fn delete_controlador(
    State(app_state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.estoque_service.delete_controlador(&role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
