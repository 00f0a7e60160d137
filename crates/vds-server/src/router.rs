use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vds_repo::Repository;

use crate::handler::{self, AppState};

/// Build the axum router serving `repo`.
///
/// Routes:
/// - `GET /` and `GET /*path` -- blob bytes, a directory listing, or with
///   the metadata suffix a JSON view with history
/// - `PUT /*path` -- conflict-checked write
pub fn build_router(repo: Repository, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(handler::get_root).put(handler::put_root))
        .route("/*path", get(handler::get_path).put(handler::put_path))
        .with_state(AppState { repo })
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
