// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, User},
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 200, description = "Usuário registrado", body = AuthResponse),
        (status = 400, description = "Campos inválidos"),
        (status = 409, description = "E-mail já em uso"),
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let (tipo, coordenacao_id) = payload.parse_perfil()?;

    let token = app_state
        .auth_service
        .register_user(&payload.email, &payload.password, tipo, coordenacao_id)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuário autenticado", body = User))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
