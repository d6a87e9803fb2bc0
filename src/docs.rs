// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Estoque ---
        handlers::estoque::list_estoque,
        handlers::estoque::create_reagente,
        handlers::estoque::create_saida,
        handlers::estoque::list_historico,
        handlers::estoque::get_relatorio,

        // --- Cadastros ---
        handlers::estoque::list_coordenacoes,
        handlers::estoque::create_coordenacao,
        handlers::estoque::delete_coordenacao,
        handlers::estoque::list_controladores,
        handlers::estoque::create_controlador,
        handlers::estoque::delete_controlador,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::perfil::TipoUsuario,
            models::perfil::Perfil,

            // --- Estoque ---
            models::estoque::Coordenacao,
            models::estoque::Controlador,
            models::estoque::Reagente,
            models::estoque::ReagenteCoordenacao,
            models::estoque::SaidaReagente,
            models::estoque::StatusValidade,
            models::estoque::LinhaEstoque,
            models::estoque::LinhaHistorico,
            models::estoque::ResumoCoordenacao,
            models::estoque::Relatorio,

            // --- Payloads ---
            handlers::estoque::ReagentePayload,
            handlers::estoque::AlocacaoPayload,
            handlers::estoque::SaidaPayload,
            handlers::estoque::CreateCoordenacaoPayload,
            handlers::estoque::CreateControladorPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Estoque", description = "Saldo, Saídas e Relatório"),
        (name = "Cadastros", description = "Coordenações e Controladores"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
