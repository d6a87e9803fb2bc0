// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::User, perfil::Role},
};

/// Papel resolvido para a requisição corrente.
///
/// Resolvido de novo a cada requisição e passado explicitamente aos
/// serviços; nenhum cache de papel sobrevive entre requisições.
pub struct CurrentRole(pub Role);

impl<S> FromRequestParts<S> for CurrentRole
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // O auth_guard já anexou o usuário; sem ele, a rota está mal montada.
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        let role = app_state.perfil_service.resolve_role(&user).await?;
        Ok(CurrentRole(role))
    }
}
