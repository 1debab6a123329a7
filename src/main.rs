use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use outfit_match::config::{CatalogBackend, Settings};
use outfit_match::core::{
    build_instruction_prompt, CatalogMatcher, MatchingPipeline, VisionResolver,
};
use outfit_match::routes::{self, styling::AppState};
use outfit_match::services::{
    CatalogStore, ChatCompletionsConfig, ChatCompletionsProvider, InMemoryCatalog, PostgresCatalog,
    VisionProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        HttpResponse::build(status).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let status_code = match &err {
        error::JsonPayloadError::OverflowKnownLength { .. }
        | error::JsonPayloadError::Overflow { .. } => 413,
        _ => 400,
    };
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_catalog(settings: &Settings) -> Result<Arc<dyn CatalogStore>, String> {
    match settings.catalog.backend {
        CatalogBackend::Memory => {
            let catalog = match &settings.catalog.seed_path {
                Some(path) => InMemoryCatalog::from_file(path).await.map_err(|e| e.to_string())?,
                None => {
                    error!("Memory catalog configured without seed_path, starting empty");
                    InMemoryCatalog::default()
                }
            };
            Ok(Arc::new(catalog))
        }
        CatalogBackend::Postgres => {
            let db = &settings.database;
            let catalog = PostgresCatalog::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| e.to_string())?;

            info!(
                "PostgreSQL catalog initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(catalog))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Outfit Match service...");

    // Vision providers, in configured order
    let vision_config = ChatCompletionsConfig {
        endpoint: settings.vision.endpoint.clone(),
        api_key: settings.vision.api_key.clone(),
        timeout_secs: settings.vision.timeout_secs,
        max_tokens: settings.vision.max_tokens,
        temperature: settings.vision.temperature,
    };

    let providers: Vec<Arc<dyn VisionProvider>> =
        ChatCompletionsProvider::from_models(&vision_config, &settings.vision.models)
            .map_err(|e| {
                error!("Failed to build vision client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn VisionProvider>)
            .collect();

    if settings.vision.api_key.is_empty() {
        error!("No vision API key configured; analysis requests will fail");
    }

    let vocabulary = Arc::new(settings.vocabulary.clone());
    let resolver = VisionResolver::new(
        providers,
        settings.vision.max_attempts,
        build_instruction_prompt(&vocabulary),
    );

    info!(
        "Vision resolver initialized (attempting up to {} of {:?})",
        settings.vision.max_attempts,
        resolver.provider_names()
    );

    let catalog = build_catalog(&settings).await.map_err(|e| {
        error!("Failed to initialize catalog: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let pipeline = MatchingPipeline::new(
        resolver,
        CatalogMatcher::new(catalog),
        vocabulary,
        Duration::from_secs(settings.catalog.lookup_timeout_secs),
    );

    // Build application state
    let max_image_bytes = settings.server.max_image_bytes;
    let app_state = AppState {
        pipeline,
        max_image_bytes,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            // Base64 inflates payloads by roughly 4/3
            .app_data(
                web::JsonConfig::default()
                    .limit(max_image_bytes * 2)
                    .error_handler(handle_json_payload_error),
            )
            .app_data(web::PayloadConfig::new(max_image_bytes + 1))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
