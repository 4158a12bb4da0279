//! 할 일 관리 서비스 메인 애플리케이션
//!
//! 설정을 읽고 서비스를 등록한 뒤 Actix-web HTTP 서버를 구동합니다.
//! MongoDB 연결은 지연 생성되며, 시작 시 한 번 미리 연결을 시도합니다.

use std::process;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use task_service_backend::config::{AppConfig, FrontendConfig};
use task_service_backend::core::registry::ServiceLocator;
use task_service_backend::db::DatabaseHandle;
use task_service_backend::repositories::{SessionRepository, TaskRepository, UserRepository};
use task_service_backend::routes::configure_all_routes;
use task_service_backend::services::auth::OAuthService;
use task_service_backend::services::{register_all, Stores};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 할 일 관리 서비스 시작중...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("설정 로드 실패: {}", e);
            process::exit(1);
        }
    };
    info!("실행 환경: {:?}", config.environment);

    // 리포지토리가 주입받는 데이터베이스 핸들을 먼저 등록합니다
    let database = DatabaseHandle::new(config.database.clone());
    ServiceLocator::set(database.clone());

    let oauth = OAuthService::from_config(&config.oauth, config.environment);
    let providers = &oauth.capabilities().providers;
    if providers.is_empty() {
        info!("소셜 로그인 비활성화: 설정된 프로바이더가 없습니다");
    } else {
        info!("소셜 로그인 활성 프로바이더: {:?}", providers);
    }

    register_all(
        &config,
        Stores {
            users: UserRepository::instance(),
            tasks: TaskRepository::instance(),
            sessions: SessionRepository::instance(),
        },
        oauth,
    );
    ServiceLocator::initialize_all();

    warm_up_database(&database).await;

    start_http_server(&config).await
}

/// 시작 시 연결을 한 번 시도합니다. 실패해도 서버는 뜨고, 요청이 다시 시도합니다.
async fn warm_up_database(database: &DatabaseHandle) {
    info!("📡 데이터베이스 연결 중...");

    match database.get().await {
        Ok(db) => info!("✅ MongoDB 연결 성공: {}", db.database_name()),
        Err(e) => warn!("⚠️ MongoDB 연결 실패, 요청 시 다시 시도합니다: {}", e),
    }
}

/// HTTP 서버를 구성하고 실행합니다
///
/// Rate Limiting, CORS, 로깅, 경로 정규화 미들웨어를 포함합니다.
async fn start_http_server(config: &AppConfig) -> std::io::Result<()> {
    let bind_address = config.server.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/api/health", bind_address);

    let rate_limit = &config.rate_limit;
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| std::io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    let frontend = config.frontend.clone();

    HttpServer::new(move || {
        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&frontend))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_default();

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            if dotenv().is_ok() {
                info!("기본 .env 파일 로드");
            }
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

/// CORS 설정을 구성합니다
///
/// `FRONTEND_URL`이 있으면 그 오리진만, 없으면 모든 오리진을 허용합니다.
/// 세션 쿠키를 위해 자격 증명을 허용합니다.
fn configure_cors(frontend: &FrontendConfig) -> Cors {
    let cors = match &frontend.url {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-auth-token"),
        ])
        .supports_credentials()
        .max_age(3600)
}
