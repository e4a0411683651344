use axum::{middleware::from_fn_with_state, response::Redirect, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    addresses, auth, dashboard, files, payments, products, response::SIGNIN_PATH, state::AppState, transactions,
    users, withdrawals,
};

/// Administrator pages, only served to `ADMIN` sessions
fn admin(app_state: &AppState) -> Router {
    Router::new()
        .merge(dashboard::routes::admin_routes(app_state.clone()))
        .nest("/users", users::routes::admin_routes(app_state.clone()))
        .nest("/addresses", addresses::routes::admin_routes(app_state.clone()))
        .nest("/products", products::routes::admin_routes(app_state.clone()))
        .nest("/transactions", transactions::routes::admin_routes(app_state.clone()))
        .nest("/payments", payments::routes::admin_routes(app_state.clone()))
        .nest("/withdrawals", withdrawals::routes::admin_routes(app_state.clone()))
        .nest("/files", files::routes::admin_routes(app_state.clone()))
        .route_layer(from_fn_with_state(app_state.clone(), auth::middleware::require_admin))
}

fn member(app_state: &AppState) -> Router {
    Router::new()
        .merge(dashboard::routes::member_routes(app_state.clone()))
        .nest("/transactions", transactions::routes::member_routes(app_state.clone()))
        .nest("/products", products::routes::member_routes(app_state.clone()))
        .nest("/addresses", addresses::routes::member_routes(app_state.clone()))
        .nest("/payments", payments::routes::member_routes(app_state.clone()))
        .nest("/withdrawals", withdrawals::routes::member_routes(app_state.clone()))
        .nest("/settings", users::routes::settings_routes(app_state.clone()))
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(SIGNIN_PATH) }))
        .nest("/auth", auth::routes::routes(app_state.clone()))
        .nest("/admin", admin(&app_state))
        .nest("/member", member(&app_state))
        .layer(TraceLayer::new_for_http())
}
