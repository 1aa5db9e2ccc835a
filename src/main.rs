use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use review_sentiment::api::{self, AppState};
use review_sentiment::config::Config;
use review_sentiment::logging;
use review_sentiment::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::analyze_upload,
        api::latest_analysis
    ),
    components(
        schemas(
            api::ErrorResponse,
            api::UploadForm,
            models::AnalysisResult,
            models::FileInfo,
            models::AnalysisSummary,
            models::SentimentDistribution,
            models::LabelShare,
            models::ScoreRange,
            models::ScoredReview,
            models::SentimentLabel,
            models::KeywordAnalysis,
            models::SentimentKeywords,
            models::KeywordEntry
        )
    ),
    tags(
        (name = "analysis", description = "Review Sentiment Analysis API"),
        (name = "health", description = "Liveness")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init();

    let config = Config::from_env();
    info!(
        "Upload limit {} bytes, CSV row cap {}",
        config.max_upload_bytes, config.csv_row_cap
    );

    let state = Arc::new(AppState::new(config.clone()));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::health))
        .route("/api/analyze", post(api::analyze_upload))
        .route("/api/analyze/latest", get(api::latest_analysis))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
