use axum::{
    extract::State,
    response::Response,
    routing::get,
    Router,
};

use crate::{auth::middleware::AuthToken, clock::DynClock, state::AppState, views::Views};

use super::{
    error::Result,
    models::{admin_page, member_page},
    Dashboard,
};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_home))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(member_home))
        .with_state(app_state)
}

async fn admin_home(
    State(dashboard): State<Dashboard>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let counts = dashboard.counts(&token).await?;
    Ok(views.detail(&admin_page(&counts))?)
}

async fn member_home(
    State(dashboard): State<Dashboard>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let summary = dashboard.member_summary(&token).await?;
    Ok(views.detail(&member_page(&summary, clock.utc_now()))?)
}
