use axum::routing::post;
use axum::Router;

use crate::handlers::push;
use crate::state::AppState;

/// ```text
/// POST /push    run the dispatch pipeline once
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/push", post(push::push))
}
