// src/services/policy.rs

use uuid::Uuid;

use crate::{common::error::AppError, models::perfil::Role};

/// Operações sujeitas ao controle de acesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operacao {
    CreateReagente,
    CreateSaida,
    GerarRelatorio,
    ManageCadastros,
    ListEstoque,
    ListHistorico,
}

impl Operacao {
    fn exige_admin(&self) -> bool {
        matches!(
            self,
            Operacao::CreateReagente
                | Operacao::CreateSaida
                | Operacao::GerarRelatorio
                | Operacao::ManageCadastros
        )
    }
}

/// Porta de autorização. O papel chega por requisição, resolvido na hora,
/// nunca de um cache compartilhado.
pub fn authorize(role: &Role, operacao: Operacao) -> Result<(), AppError> {
    if operacao.exige_admin() && !role.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Escopo de listagem: coordenação enxerga só a própria unidade; admin
/// pode filtrar por qualquer uma (ou nenhuma).
pub fn coordenacao_scope(role: &Role, solicitada: Option<Uuid>) -> Option<Uuid> {
    match role {
        Role::Admin => solicitada,
        Role::Coord(coordenacao) => Some(coordenacao.id),
    }
}
