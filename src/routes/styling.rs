use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchingPipeline, PipelineError, PipelineOutcome};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthResponse, ImageError, ImageInput,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MatchingPipeline,
    pub max_image_bytes: usize,
}

/// Configure styling routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/styling/analyze", web::post().to(analyze))
        .route("/styling/analyze/upload", web::post().to(analyze_upload));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let catalog_healthy = state
        .pipeline
        .matcher()
        .store()
        .health_check()
        .await
        .unwrap_or(false);

    let status = if catalog_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Analyze styling request
///
/// POST /api/v1/styling/analyze
///
/// Request body:
/// ```json
/// {
///   "image": "data:image/jpeg;base64,...",
///   "mimeType": "image/jpeg"
/// }
/// ```
async fn analyze(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let image = ImageInput::from_encoded(&req.image, req.mime_type.as_deref())
        .and_then(|image| image.ensure_within(state.max_image_bytes));

    run_pipeline(&state, image).await
}

/// Analyze a raw image upload
///
/// POST /api/v1/styling/analyze/upload
///
/// Body is the image bytes with an `image/*` content type.
async fn analyze_upload(
    state: web::Data<AppState>,
    body: web::Bytes,
    http_req: HttpRequest,
) -> impl Responder {
    let mime_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let image = ImageInput::new(body.to_vec(), mime_type)
        .and_then(|image| image.ensure_within(state.max_image_bytes));

    run_pipeline(&state, image).await
}

async fn run_pipeline(state: &AppState, image: Result<ImageInput, ImageError>) -> HttpResponse {
    let image = match image {
        Ok(image) => image,
        Err(e) => {
            tracing::info!("Rejected image upload: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_image",
                e.to_string(),
                400,
            ));
        }
    };

    tracing::info!("Analyzing {} byte {} image", image.len(), image.mime_type());

    match state.pipeline.run(&image).await {
        Ok(PipelineOutcome { identified_item, suggestions }) => {
            HttpResponse::Ok().json(AnalyzeResponse { identified_item, suggestions })
        }
        Err(e) => pipeline_error_response(&e),
    }
}

/// Map a terminal pipeline failure to its HTTP response
pub fn pipeline_error_response(err: &PipelineError) -> HttpResponse {
    match err {
        PipelineError::AnalysisFailed => HttpResponse::BadGateway().json(ErrorResponse::new(
            "analysis_failed",
            "Could not analyze the image. Please try again with a clearer photo.",
            502,
        )),
        PipelineError::NoMatches => HttpResponse::NotFound().json(ErrorResponse::new(
            "no_matches",
            "We understood your item, but nothing in stock matches it right now.",
            404,
        )),
        PipelineError::Internal(detail) => {
            tracing::error!("Internal pipeline error: {}", detail);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "internal_error",
                "Something went wrong while styling your item.",
                500,
            ))
        }
    }
}
