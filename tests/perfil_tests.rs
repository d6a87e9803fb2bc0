// Perfis e resolução de papel: a restrição papel/coordenação vive no
// banco, e contas privilegiadas sempre resolvem como admin.

mod common;

use sqlx::PgPool;
use uuid::Uuid;

use estoque_reagentes::{
    common::error::AppError,
    db::{PerfilRepository, UserRepository},
    models::{
        auth::User,
        perfil::{Role, TipoUsuario},
    },
    services::{auth::AuthService, perfil::PerfilService},
};

async fn criar_usuario(pool: &PgPool, email: &str, is_superuser: bool, is_staff: bool) -> User {
    UserRepository::new(pool.clone())
        .create_user(pool, email, "$2b$12$hash-de-teste", is_superuser, is_staff)
        .await
        .unwrap()
}

fn auth_service(pool: &PgPool) -> AuthService {
    AuthService::new(
        UserRepository::new(pool.clone()),
        PerfilRepository::new(pool.clone()),
        "segredo-de-teste".into(),
        pool.clone(),
    )
}

#[sqlx::test]
async fn banco_rejeita_admin_com_coordenacao(pool: PgPool) {
    let usuario = criar_usuario(&pool, "admin@lab.br", false, false).await;
    let coordenacao = common::criar_coordenacao(&pool, "Coord A").await;

    let resultado = sqlx::query("INSERT INTO perfis (user_id, tipo, coordenacao_id) VALUES ($1, 'admin', $2)")
        .bind(usuario.id)
        .bind(coordenacao.id)
        .execute(&pool)
        .await;

    let erro = resultado.unwrap_err();
    assert!(erro.as_database_error().unwrap().is_check_violation());
}

#[sqlx::test]
async fn banco_rejeita_coord_sem_coordenacao(pool: PgPool) {
    let usuario = criar_usuario(&pool, "coord@lab.br", false, false).await;

    let resultado =
        sqlx::query("INSERT INTO perfis (user_id, tipo, coordenacao_id) VALUES ($1, 'coord', NULL)")
            .bind(usuario.id)
            .execute(&pool)
            .await;

    let erro = resultado.unwrap_err();
    assert!(erro.as_database_error().unwrap().is_check_violation());
}

#[sqlx::test]
async fn perfis_validos_passam(pool: PgPool) {
    let repo = PerfilRepository::new(pool.clone());
    let admin = criar_usuario(&pool, "admin@lab.br", false, false).await;
    let coord = criar_usuario(&pool, "coord@lab.br", false, false).await;
    let coordenacao = common::criar_coordenacao(&pool, "Coord A").await;

    repo.create_perfil(&pool, admin.id, TipoUsuario::Admin, None)
        .await
        .unwrap();
    repo.create_perfil(&pool, coord.id, TipoUsuario::Coord, Some(coordenacao.id))
        .await
        .unwrap();
}

#[sqlx::test]
async fn repo_converte_violacao_de_check_em_conflito(pool: PgPool) {
    let repo = PerfilRepository::new(pool.clone());
    let usuario = criar_usuario(&pool, "admin@lab.br", false, false).await;
    let coordenacao = common::criar_coordenacao(&pool, "Coord A").await;

    let erro = repo
        .create_perfil(&pool, usuario.id, TipoUsuario::Admin, Some(coordenacao.id))
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::ConstraintViolation(_)));
}

#[sqlx::test]
async fn superuser_sem_perfil_resolve_como_admin(pool: PgPool) {
    let servico = PerfilService::new(PerfilRepository::new(pool.clone()));
    let superuser = criar_usuario(&pool, "root@lab.br", true, false).await;
    let staff = criar_usuario(&pool, "staff@lab.br", false, true).await;

    assert_eq!(servico.resolve_role(&superuser).await.unwrap(), Role::Admin);
    assert_eq!(servico.resolve_role(&staff).await.unwrap(), Role::Admin);
}

#[sqlx::test]
async fn usuario_comum_sem_perfil_e_barrado(pool: PgPool) {
    let servico = PerfilService::new(PerfilRepository::new(pool.clone()));
    let usuario = criar_usuario(&pool, "semperfil@lab.br", false, false).await;

    let erro = servico.resolve_role(&usuario).await.unwrap_err();
    assert!(matches!(erro, AppError::ProfileNotFound));
}

#[sqlx::test]
async fn perfil_coord_resolve_com_a_coordenacao(pool: PgPool) {
    let repo = PerfilRepository::new(pool.clone());
    let servico = PerfilService::new(repo.clone());
    let usuario = criar_usuario(&pool, "coord@lab.br", false, false).await;
    let coordenacao = common::criar_coordenacao(&pool, "Química Analítica").await;

    repo.create_perfil(&pool, usuario.id, TipoUsuario::Coord, Some(coordenacao.id))
        .await
        .unwrap();

    match servico.resolve_role(&usuario).await.unwrap() {
        Role::Coord(resolvida) => {
            assert_eq!(resolvida.id, coordenacao.id);
            assert_eq!(resolvida.nome, "Química Analítica");
        }
        Role::Admin => panic!("perfil coord resolveu como admin"),
    }
}

#[sqlx::test]
async fn ensure_admin_corrige_perfil_divergente(pool: PgPool) {
    let repo = PerfilRepository::new(pool.clone());
    let usuario = criar_usuario(&pool, "promovido@lab.br", false, false).await;
    let coordenacao = common::criar_coordenacao(&pool, "Coord A").await;

    repo.create_perfil(&pool, usuario.id, TipoUsuario::Coord, Some(coordenacao.id))
        .await
        .unwrap();

    // Rodar duas vezes dá no mesmo: upsert idempotente.
    repo.ensure_admin_perfil(&pool, usuario.id).await.unwrap();
    let perfil = repo.ensure_admin_perfil(&pool, usuario.id).await.unwrap();

    assert_eq!(perfil.tipo, TipoUsuario::Admin);
    assert!(perfil.coordenacao_id.is_none());

    let gravado = repo.find_by_user(usuario.id).await.unwrap().unwrap();
    assert_eq!(gravado.tipo, TipoUsuario::Admin);
    assert!(gravado.coordenacao_id.is_none());
}

#[sqlx::test]
async fn registro_cria_usuario_e_perfil_juntos(pool: PgPool) {
    let servico = auth_service(&pool);
    let coordenacao = common::criar_coordenacao(&pool, "Coord A").await;

    let token = servico
        .register_user(
            "nova@lab.br",
            "123456789",
            TipoUsuario::Coord,
            Some(coordenacao.id),
        )
        .await
        .unwrap();
    assert!(!token.is_empty());

    let usuario = servico.validate_token(&token).await.unwrap();
    assert_eq!(usuario.email, "nova@lab.br");

    let perfil = PerfilRepository::new(pool.clone())
        .find_by_user(usuario.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(perfil.tipo, TipoUsuario::Coord);
    assert_eq!(perfil.coordenacao_id, Some(coordenacao.id));
}

#[sqlx::test]
async fn registro_com_coordenacao_inexistente_desfaz_o_usuario(pool: PgPool) {
    let servico = auth_service(&pool);

    let erro = servico
        .register_user(
            "orfa@lab.br",
            "123456789",
            TipoUsuario::Coord,
            Some(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::NotFound(_)));

    // Transação única: o usuário não pode sobrar sem perfil.
    let usuarios: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(usuarios, 0);
}

#[sqlx::test]
async fn login_devolve_token_valido(pool: PgPool) {
    let servico = auth_service(&pool);

    servico
        .register_user("ana@lab.br", "123456789", TipoUsuario::Admin, None)
        .await
        .unwrap();

    let token = servico.login_user("ana@lab.br", "123456789").await.unwrap();
    let usuario = servico.validate_token(&token).await.unwrap();
    assert_eq!(usuario.email, "ana@lab.br");

    let erro = servico
        .login_user("ana@lab.br", "senha-errada")
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::InvalidCredentials));
}

#[sqlx::test]
async fn email_duplicado_e_conflito(pool: PgPool) {
    let servico = auth_service(&pool);

    servico
        .register_user("ana@lab.br", "123456789", TipoUsuario::Admin, None)
        .await
        .unwrap();

    let erro = servico
        .register_user("ana@lab.br", "987654321", TipoUsuario::Admin, None)
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::EmailAlreadyExists));
}
