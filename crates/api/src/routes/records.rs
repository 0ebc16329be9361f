//! Route definitions for the `/records` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET    /         -> list_records (flat, or grouped via ?grouped=true)
/// POST   /         -> ingest_records
/// PUT    /         -> update_labels
/// PUT    /reject   -> reject_records
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(records::list_records)
                .post(records::ingest_records)
                .put(records::update_labels),
        )
        .route("/reject", put(records::reject_records))
}
