// src/models/perfil.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::estoque::Coordenacao;

// O tipo gravado no banco (enum tipo_usuario).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoUsuario {
    Admin,
    Coord,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Perfil {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tipo: TipoUsuario,
    pub coordenacao_id: Option<Uuid>,
}

// Linha do perfil com a coordenação já resolvida (JOIN).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PerfilComCoordenacao {
    pub tipo: TipoUsuario,
    pub coordenacao_id: Option<Uuid>,
    pub coordenacao_nome: Option<String>,
}

// Papel resolvido por requisição. Admins (reais ou contas privilegiadas)
// não carregam coordenação; usuários de coordenação carregam exatamente uma.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Admin,
    Coord(Coordenacao),
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn coordenacao_id(&self) -> Option<Uuid> {
        match self {
            Role::Admin => None,
            Role::Coord(coordenacao) => Some(coordenacao.id),
        }
    }
}
