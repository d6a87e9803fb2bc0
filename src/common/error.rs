use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Toda falha do núcleo vira uma variante tipada; nada é engolido em silêncio.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Usuário autenticado mas sem perfil gravado (e sem flag privilegiada).
    #[error("Usuário sem perfil")]
    ProfileNotFound,

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // O par (reagente, coordenação) não tem linha de saldo.
    #[error("Reagente não disponível para esta coordenação")]
    AllocationNotFound,

    // Rejeição de regra de negócio, não falha de sistema. Estado intacto.
    #[error("Quantidade insuficiente em estoque")]
    InsufficientStock,

    // Violação de restrição no armazenamento (unicidade, FK, CHECK).
    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro de campo avulso, para compor `ValidationErrors` manualmente.
pub fn field_error(code: &'static str, mensagem: &'static str) -> ValidationError {
    let mut erro = ValidationError::new(code);
    erro.message = Some(mensagem.into());
    erro
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            // 401 manda o cliente reautenticar; 403 é negação para quem já
            // está autenticado.
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::ProfileNotFound => {
                (StatusCode::FORBIDDEN, "Usuário sem perfil.".to_string())
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.".to_string(),
            ),
            AppError::NotFound(entidade) => {
                (StatusCode::NOT_FOUND, format!("{entidade} não encontrado."))
            }
            AppError::AllocationNotFound => (
                StatusCode::NOT_FOUND,
                "Este reagente não está disponível para esta coordenação.".to_string(),
            ),
            AppError::InsufficientStock => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Quantidade insuficiente em estoque.".to_string(),
            ),
            AppError::ConstraintViolation(detalhe) => (StatusCode::CONFLICT, detalhe),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente vê um aviso genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
