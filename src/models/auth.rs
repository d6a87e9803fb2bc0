// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::error::{field_error, AppError};
use crate::models::perfil::TipoUsuario;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    // Flags do colaborador de identidade: conta privilegiada é sempre admin.
    pub is_superuser: bool,
    pub is_staff: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    // "admin" ou "coord"; qualquer outro valor é erro de campo.
    pub tipo: String,
    pub coordenacao_id: Option<Uuid>,
}

impl RegisterUserPayload {
    /// Admin nunca leva coordenação; coord exige uma.
    pub fn parse_perfil(&self) -> Result<(TipoUsuario, Option<Uuid>), AppError> {
        let tipo = match self.tipo.as_str() {
            "admin" => TipoUsuario::Admin,
            "coord" => TipoUsuario::Coord,
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add(
                    "tipo".into(),
                    field_error("invalido", "Tipo de usuário inválido."),
                );
                return Err(AppError::ValidationError(errors));
            }
        };

        match tipo {
            TipoUsuario::Admin => Ok((tipo, None)),
            TipoUsuario::Coord => {
                if self.coordenacao_id.is_none() {
                    let mut errors = ValidationErrors::new();
                    errors.add(
                        "coordenacao".into(),
                        field_error(
                            "obrigatorio",
                            "Usuário de coordenação precisa escolher uma coordenação.",
                        ),
                    );
                    return Err(AppError::ValidationError(errors));
                }
                Ok((tipo, self.coordenacao_id))
            }
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tipo: &str, coordenacao_id: Option<Uuid>) -> RegisterUserPayload {
        RegisterUserPayload {
            email: "a@b.com".into(),
            password: "123456789".into(),
            tipo: tipo.into(),
            coordenacao_id,
        }
    }

    #[test]
    fn tipo_desconhecido_e_erro_de_campo() {
        let err = payload("gestor", None).parse_perfil().unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("tipo"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn coord_sem_coordenacao_e_erro_de_campo() {
        let err = payload("coord", None).parse_perfil().unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("coordenacao"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn admin_ignora_coordenacao() {
        let (tipo, coordenacao) = payload("admin", Some(Uuid::new_v4()))
            .parse_perfil()
            .unwrap();
        assert_eq!(tipo, TipoUsuario::Admin);
        assert!(coordenacao.is_none());
    }
}
