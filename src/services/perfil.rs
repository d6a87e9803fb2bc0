// src/services/perfil.rs

use crate::{
    common::error::AppError,
    db::PerfilRepository,
    models::{
        auth::User,
        estoque::Coordenacao,
        perfil::{Role, TipoUsuario},
    },
};

#[derive(Clone)]
pub struct PerfilService {
    perfil_repo: PerfilRepository,
}

impl PerfilService {
    pub fn new(perfil_repo: PerfilRepository) -> Self {
        Self { perfil_repo }
    }

    /// Resolve o papel do usuário autenticado.
    ///
    /// Contas privilegiadas (superuser/staff) são sempre admin, exista
    /// perfil gravado ou não. A materialização do perfil acontece no
    /// evento de gravação do usuário, não aqui.
    pub async fn resolve_role(&self, user: &User) -> Result<Role, AppError> {
        if user.is_superuser || user.is_staff {
            return Ok(Role::Admin);
        }

        let perfil = self
            .perfil_repo
            .find_by_user(user.id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        match perfil.tipo {
            TipoUsuario::Admin => Ok(Role::Admin),
            TipoUsuario::Coord => {
                // A restrição do banco garante a coordenação preenchida.
                let (Some(id), Some(nome)) = (perfil.coordenacao_id, perfil.coordenacao_nome)
                else {
                    return Err(anyhow::anyhow!("perfil coord sem coordenação vinculada").into());
                };
                Ok(Role::Coord(Coordenacao { id, nome }))
            }
        }
    }
}
