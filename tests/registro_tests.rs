// Registro de reagente: validação itemizada e atomicidade das alocações.

mod common;

use chrono::NaiveDate;
use sqlx::PgPool;

use estoque_reagentes::{
    common::error::AppError,
    models::perfil::Role,
    services::estoque::{NovaAlocacao, NovoReagente},
};

fn novo_reagente(
    controlador_id: uuid::Uuid,
    alocacoes: Vec<NovaAlocacao>,
) -> NovoReagente {
    NovoReagente {
        nome: "Ácido Clorídrico".into(),
        fispq: "F-010".into(),
        controlador_id,
        armario: "B2".into(),
        validade: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
        nota_fiscal: Some("notas/nf-123.pdf".into()),
        alocacoes,
    }
}

#[sqlx::test]
async fn registro_cria_reagente_e_uma_alocacao_por_coordenacao(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let controlador = common::criar_controlador(&pool, "Controlador X").await;
    let coord_a = common::criar_coordenacao(&pool, "Coord A").await;
    let coord_b = common::criar_coordenacao(&pool, "Coord B").await;

    let reagente = servico
        .register_reagente(
            &Role::Admin,
            &novo_reagente(
                controlador.id,
                vec![
                    NovaAlocacao {
                        coordenacao_id: coord_a.id,
                        quantidade: 4,
                    },
                    NovaAlocacao {
                        coordenacao_id: coord_b.id,
                        quantidade: 6,
                    },
                ],
            ),
        )
        .await
        .unwrap();

    assert_eq!(reagente.nome, "Ácido Clorídrico");
    assert!(reagente.ativo);
    assert_eq!(
        common::quantidade_alocada(&pool, reagente.id, coord_a.id).await,
        4
    );
    assert_eq!(
        common::quantidade_alocada(&pool, reagente.id, coord_b.id).await,
        6
    );
}

#[sqlx::test]
async fn coordenacao_duplicada_nao_cria_linha_nenhuma(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let controlador = common::criar_controlador(&pool, "Controlador X").await;
    let coord_a = common::criar_coordenacao(&pool, "Coord A").await;

    let erro = servico
        .register_reagente(
            &Role::Admin,
            &novo_reagente(
                controlador.id,
                vec![
                    NovaAlocacao {
                        coordenacao_id: coord_a.id,
                        quantidade: 3,
                    },
                    NovaAlocacao {
                        coordenacao_id: coord_a.id,
                        quantidade: 2,
                    },
                ],
            ),
        )
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::ValidationError(_)));
    assert_eq!(common::total_reagentes(&pool).await, 0);
}

#[sqlx::test]
async fn coordenacao_inexistente_desfaz_o_reagente(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let controlador = common::criar_controlador(&pool, "Controlador X").await;

    let erro = servico
        .register_reagente(
            &Role::Admin,
            &novo_reagente(
                controlador.id,
                vec![NovaAlocacao {
                    coordenacao_id: uuid::Uuid::new_v4(),
                    quantidade: 3,
                }],
            ),
        )
        .await
        .unwrap_err();

    // A transação inteira volta atrás: nem o reagente sobrevive.
    assert!(matches!(erro, AppError::NotFound(_)));
    assert_eq!(common::total_reagentes(&pool).await, 0);
}

#[sqlx::test]
async fn coord_nao_pode_registrar(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let controlador = common::criar_controlador(&pool, "Controlador X").await;
    let coord_a = common::criar_coordenacao(&pool, "Coord A").await;

    let erro = servico
        .register_reagente(
            &Role::Coord(coord_a.clone()),
            &novo_reagente(
                controlador.id,
                vec![NovaAlocacao {
                    coordenacao_id: coord_a.id,
                    quantidade: 3,
                }],
            ),
        )
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::Forbidden));
    assert_eq!(common::total_reagentes(&pool).await, 0);
}

#[sqlx::test]
async fn alocacao_duplicada_no_banco_e_conflito(pool: PgPool) {
    let cenario = common::semear_estoque(&pool, "Acetona", 10).await;
    let repo = estoque_reagentes::db::EstoqueRepository::new(pool.clone());

    let erro = repo
        .create_alocacao(&pool, cenario.reagente_id, cenario.coordenacao.id, 5)
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::ConstraintViolation(_)));
}

#[sqlx::test]
async fn coordenacao_com_alocacao_nao_pode_ser_removida(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let cenario = common::semear_estoque(&pool, "Acetona", 10).await;

    let erro = servico
        .delete_coordenacao(&Role::Admin, cenario.coordenacao.id)
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::ConstraintViolation(_)));

    // Sem referências, a remoção passa.
    let coord_livre = common::criar_coordenacao(&pool, "Coord Livre").await;
    servico
        .delete_coordenacao(&Role::Admin, coord_livre.id)
        .await
        .unwrap();
}

#[sqlx::test]
async fn controlador_referenciado_nao_pode_ser_removido(pool: PgPool) {
    let servico = common::estoque_service(&pool);
    let cenario = common::semear_estoque(&pool, "Acetona", 10).await;

    let erro = servico
        .delete_controlador(&Role::Admin, cenario.controlador_id)
        .await
        .unwrap_err();

    assert!(matches!(erro, AppError::ConstraintViolation(_)));
}
