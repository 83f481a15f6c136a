//! # Beonyeok 번역 서버 진입점
//!
//! 이 파일은 Beonyeok 애플리케이션의 **시작점(entry point)**입니다.
//! Rust 프로그램은 항상 `main()` 함수에서 실행이 시작됩니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. API 라우터 설정
//! 6. HTTP 서버 시작

// ── 모듈 선언 ──
// `mod` 키워드는 다른 파일을 모듈로 가져옵니다.
// 예: `mod config;`는 같은 디렉토리의 `config.rs` 또는 `config/mod.rs`를 가져옵니다.
// Rust에서는 파일 시스템 구조가 곧 모듈 구조입니다.
mod config;
mod db;
mod error;
mod llm;
mod middleware;
mod models;
mod routes;

// ── 외부 크레이트 및 모듈에서 필요한 항목 가져오기 ──
use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::{
    routing::{get, post}, // HTTP 메서드별 라우팅 함수들
    Router,               // 라우터: URL 경로와 핸들러를 연결하는 구조체
};
use config::Config;
use routes::{translate::AppState, *};
use sqlx::sqlite::SqlitePoolOptions;
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},          // CORS(Cross-Origin Resource Sharing) 설정
    services::{ServeDir, ServeFile}, // 정적 파일 서빙 서비스
    trace::TraceLayer,               // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// #[tokio::main]: 비동기 런타임을 시작하는 어트리뷰트 매크로.
// 백그라운드 번역/메타데이터 태스크(tokio::spawn)가 응답 이후에도
// 계속 실행되려면 멀티스레드 Tokio 런타임이 필요합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일에서 환경변수를 읽어옵니다. (DATABASE_URL, API 키 등)
    // .ok()는 Result를 Option으로 변환하여, .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG 환경변수가 없으면 우리 크레이트와 HTTP 레이어를 debug로 설정합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beonyeok=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!(
        "Starting Beonyeok server on {}:{}",
        config.host,
        config.port
    );

    // 키가 하나도 없으면 서버는 뜨지만 모든 번역이 실패하므로 미리 경고합니다
    if config.openai_api_key.is_none()
        && config.anthropic_api_key.is_none()
        && config.gemini_api_key.is_none()
    {
        tracing::warn!("No provider API keys configured; all translation calls will fail");
    }

    // ── 4단계: SQLite 연결 풀 생성 ──
    // 연결 풀: 데이터베이스 연결을 미리 만들어두고 재사용하는 패턴.
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    // sqlx::migrate!는 컴파일 타임에 ./migrations 폴더의 SQL 파일들을 포함시키는 매크로
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 애플리케이션 상태(State) 생성 ──
    // AppState: 모든 라우트 핸들러가 공유하는 데이터를 담는 구조체.
    // Config는 백그라운드 태스크들과 공유해야 하므로 Arc로 감쌉니다.
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
    };

    // ── 7단계: API 라우터 설정 ──
    // axum 0.8부터 경로 파라미터는 :id가 아니라 {id} 문법을 사용합니다.
    let api_routes = Router::new()
        // 번역 오케스트레이터 — LLM 완료를 기다리지 않고 즉시 응답합니다
        .route("/translate", post(routes::translate::translate))
        // 문법 검사 — 동기 요청-응답, 세션에 기록하지 않음
        .route("/grammar-check", post(grammar_check))
        // 벤치마크 — 여러 모델 병렬 비교
        .route("/benchmark", post(benchmark))
        // 세션 조회/삭제 (상세 조회가 번역 완료를 관찰하는 폴링 표면)
        .route("/sessions", get(list_sessions).delete(clear_sessions))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        // 사용자 전역 번역 지침
        .route("/settings", get(get_settings).put(update_settings))
        // 헬스체크 API (서버 상태 확인용, 인증 없음)
        .route("/health", get(health_check))
        // .with_state(): 이 라우터의 모든 핸들러에서 AppState를 사용할 수 있게 합니다.
        .with_state(state);

    // ── 8단계: CORS 미들웨어 설정 ──
    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    // 프로덕션에서는 특정 도메인만 허용해야 합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 9단계: 프론트엔드 정적 파일 서빙 설정 ──
    // 빌드된 프론트엔드 파일이 있으면 같은 서버에서 서빙합니다.
    // SPA이므로, 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    let frontend_dist = Path::new("../web/dist");
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from ../web/dist");

        let serve_dir =
            ServeDir::new("../web/dist").not_found_service(ServeFile::new("../web/dist/index.html"));

        Router::new()
            .nest("/api/v1", api_routes)
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");

        Router::new()
            .nest("/api/v1", api_routes)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 10단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
