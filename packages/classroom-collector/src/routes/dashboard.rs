use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Serves the dashboard page as-is from disk.
async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = &state.config().dashboard_path;
    match tokio::fs::read_to_string(path).await {
        Ok(body) => Ok(Html(body)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "dashboard file missing");
            Err(AppError::not_found("dashboard not found"))
        }
        Err(err) => Err(AppError::internal(format!(
            "failed to read dashboard {}: {err}",
            path.display()
        ))),
    }
}
