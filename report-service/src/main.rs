use report_service::{AppConfig, create_app};
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Check required environment variables
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("Error: OPENAI_API_KEY environment variable is required");
        std::process::exit(1);
    }
    if std::env::var("SUPABASE_URL").is_err() {
        warn!("SUPABASE_URL not set; auth routes will reject all requests");
    }

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let app = create_app(AppConfig::from_env());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!("Health Report Analysis Service starting on {}", addr);
    info!("BMI/chat endpoint: POST http://{}/api/bmi-analysis", addr);
    info!("Report analysis endpoint: POST http://{}/reports/analyze", addr);
    info!("Health check endpoint: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
