//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

use estoque_reagentes::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Estoque, histórico, relatório e cadastros de referência
    let estoque_routes = Router::new()
        .route("/estoque", get(handlers::estoque::list_estoque))
        .route("/estoque/reagentes", post(handlers::estoque::create_reagente))
        .route(
            "/estoque/saidas",
            post(handlers::estoque::create_saida).get(handlers::estoque::list_historico),
        )
        .route("/estoque/relatorio", get(handlers::estoque::get_relatorio))
        .route(
            "/coordenacoes",
            post(handlers::estoque::create_coordenacao)
                .get(handlers::estoque::list_coordenacoes),
        )
        .route(
            "/coordenacoes/{id}",
            delete(handlers::estoque::delete_coordenacao),
        )
        .route(
            "/controladores",
            post(handlers::estoque::create_controlador)
                .get(handlers::estoque::list_controladores),
        )
        .route(
            "/controladores/{id}",
            delete(handlers::estoque::delete_controlador),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api", estoque_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
