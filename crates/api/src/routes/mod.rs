pub mod health;
pub mod records;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /records          GET (flat or grouped listing), POST (ingest), PUT (label)
/// /records/reject   PUT (whole-group chart rejection)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/records", records::router())
}
