use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use log::info;

use crate::{
    api::query::{PageParams, PaginationInfo},
    auth::middleware::AuthToken,
    clock::DynClock,
    config::Config,
    state::AppState,
    views::{
        format,
        models::{ActionForm, Area, DetailPage, Media, Section, TablePage, TableRow},
        Views,
    },
};

use super::{error::Result, DynFileService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(list_files))
        .route("/{file_id}", get(view_file))
        .route("/{file_id}/delete", post(delete_file))
        .with_state(app_state)
}

async fn list_files(
    State(file_svc): State<DynFileService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = file_svc.list_files(&token, query.clone()).await?;
    let now = clock.utc_now();

    let rows = page
        .items
        .iter()
        .map(|file| TableRow {
            href: format!("/admin/files/{}", file.file_id),
            cells: vec![
                format::text(&file.original_name),
                format::text(&file.file_type),
                format::megabytes(file.size),
                format::datetime_opt(file.created_at, now),
            ],
        })
        .collect();

    let table = TablePage::new(
        Area::Admin,
        "Files",
        "/admin/files",
        vec!["Name", "Type", "Size", "Created"],
        rows,
        PaginationInfo::of(&query, &page),
    );
    Ok(views.table(&table)?)
}

async fn view_file(
    State(file_svc): State<DynFileService>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(file_id): Path<String>,
) -> Result<Response> {
    let file = file_svc.get_file(&token, &file_id).await?;
    let now = clock.utc_now();

    let mut page = DetailPage::new(Area::Admin, format!("File {}", format::text(&file.original_name)))
        .section(
            Section::new("File")
                .row("File ID", file.file_id.clone())
                .row("Original name", format::text(&file.original_name))
                .row("Cloud URL", format::text(&file.cloud_url))
                .row("Cloud ID", format::text(&file.cloud_id))
                .row("Type", format::text(&file.file_type))
                .row("Size", format::megabytes(file.size))
                .row("Created", format::datetime_opt(file.created_at, now))
                .row("Updated", format::datetime_opt(file.updated_at, now)),
        )
        .link("Back to files", "/admin/files")
        .form(ActionForm::new("Delete file", format!("/admin/files/{file_id}/delete")).danger());
    if let Some(url) = &file.cloud_url {
        page.media.push(Media { kind: file.media_kind(), url: url.clone() });
    }
    Ok(views.detail(&page)?)
}

async fn delete_file(
    State(file_svc): State<DynFileService>,
    AuthToken(token): AuthToken,
    Path(file_id): Path<String>,
) -> Result<Response> {
    file_svc.delete_file(&token, &file_id).await?;
    info!("Deleted file {}", file_id);
    Ok(Redirect::to("/admin/files").into_response())
}
