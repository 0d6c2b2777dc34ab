use anyhow::Context;
use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use server::{models::config::ServerConfig, routes, state::AppState};

// ログ設定
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .filter_module("tower_http", level)
        .filter_module("axum", level)
        .parse_default_env()
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    let config = ServerConfig::from_env();
    init_logger(config.verbose_logging); // ロガーの初期化
    log::info!(
        "Auto advance: {}, early advance policy: {:?}",
        config.auto_advance_phases,
        config.early_advance_policy
    );

    // CORSレイヤーの設定
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid ALLOWED_ORIGIN: {}", config.allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE]);

    let addr = config.bind_addr;
    let state = AppState::new(config);

    // ルーティングの設定
    let app = routes::create_routes(state).layer(cors).layer(
        TraceLayer::new_for_http() // HTTPトレースログを有効化
            .make_span_with(|request: &http::Request<_>| {
                tracing::info_span!(
                    "HTTP request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
    );

    // サーバーの起動
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    log::info!("サーバーを起動しました: http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
