// ============================
// crates/backend-lib/src/router.rs
// ============================
//! Route table.
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers::{auth, orders, pages};
use crate::middleware::require_session;
use crate::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    // everything in here sits behind the session gate
    let protected = Router::new()
        .route("/submit-cart", post(orders::submit_cart))
        .route_layer(from_fn_with_state(state.gate.clone(), require_session));

    Router::new()
        .route("/", get(pages::home))
        .route("/menu", get(pages::menu))
        .route("/contact", get(pages::contact))
        .route("/booking", get(pages::booking_page).post(pages::booking))
        .route("/cart", get(pages::cart))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .merge(protected)
        .nest_service("/static", ServeDir::new(&state.settings.static_dir))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
