pub mod error;
pub mod models;
pub mod multipart;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;

#[cfg(test)]
use mockall::automock;

use crate::{
    api::{
        query::{ListQuery, Page},
        ApiClient, ApiRequest, Upload,
    },
    views::models::{Media, MediaKind},
};

use {error::*, models::*};

#[cfg(test)]
mod test;

pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

pub type DynFileService = Arc<dyn FileService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileService {
    async fn upload(&self, token: &str, upload: Upload) -> Result<UploadedFile>;
    async fn list_files(&self, token: &str, query: ListQuery) -> Result<Page<FileRecord>>;
    async fn get_file(&self, token: &str, file_id: &str) -> Result<FileRecord>;
    async fn delete_file(&self, token: &str, file_id: &str) -> Result<()>;
}

pub struct ApiFileService {
    api: ApiClient,
}

impl ApiFileService {
    pub fn new_dyn(api: ApiClient) -> DynFileService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl FileService for ApiFileService {
    async fn upload(&self, token: &str, upload: Upload) -> Result<UploadedFile> {
        Ok(self.api.fetch(ApiRequest::post("/upload").token(token).file(upload)).await?)
    }

    async fn list_files(&self, token: &str, query: ListQuery) -> Result<Page<FileRecord>> {
        let req = ApiRequest::get("/files").token(token).list(&query);
        Ok(self.api.list(req, "file_items").await?)
    }

    async fn get_file(&self, token: &str, file_id: &str) -> Result<FileRecord> {
        Ok(self.api.fetch(ApiRequest::get(format!("/files/{file_id}")).token(token)).await?)
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/files/{file_id}")).token(token)).await?)
    }
}

/// Checks an upload against what the input accepts, returning the message to show
pub fn check_upload(upload: &Upload, kind: MediaKind) -> std::result::Result<(), &'static str> {
    match kind {
        MediaKind::Image if !upload.content_type.starts_with("image/") => Err("Please upload an image file"),
        MediaKind::Video if !upload.content_type.starts_with("video/") => Err("Please upload a video file"),
        MediaKind::Video if upload.bytes.len() > MAX_VIDEO_BYTES => Err("Video size must be less than 100MB"),
        _ => Ok(()),
    }
}

///
/// Resolves file ids to playable media, concurrently. Files that can
/// not be found or carry no URL are left out.
///
pub async fn media(file_svc: &DynFileService, token: &str, file_ids: &[String]) -> Vec<Media> {
    let lookups = file_ids.iter().map(|id| async move {
        match file_svc.get_file(token, id).await {
            Ok(file) => file.cloud_url.clone().map(|url| Media { kind: file.media_kind(), url }),
            Err(err) => {
                warn!("Could not load file {}: {}", id, err);
                None
            }
        }
    });
    join_all(lookups).await.into_iter().flatten().collect()
}
