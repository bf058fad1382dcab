//! Central collector for classroom attention reports.
//!
//! Participants POST a report every interval; the collector keeps their latest
//! state, evicts the silent ones into history, and rolls everyone up into a
//! session report when the class ends.

pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

pub fn create_app(config: Config) -> axum::Router {
    let state = AppState::new(config);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
