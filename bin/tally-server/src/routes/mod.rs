//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - upload / status / result routes
//! - health route
//! - optional Swagger UI at `/swagger-ui` (disable with `TALLY_ENABLE_SWAGGER=false`)
//! - CORS and per-request trace-id middleware

pub mod doc;
mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{Router, middleware};
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(tasks::router(&state));

    if state.config.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()),
        );
    }

    app
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
