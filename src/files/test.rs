use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::{
    api::{self, ApiClient, ApiResponse, MockApiTransport, Payload, Upload},
    views::models::MediaKind,
};

use super::{
    check_upload, error::Error, media, models::FileRecord, multipart::MultipartForm, ApiFileService, DynFileService,
    FileService, MockFileService, MAX_VIDEO_BYTES,
};

fn upload(content_type: &str, len: usize) -> Upload {
    Upload { file_name: "clip".into(), content_type: content_type.into(), bytes: vec![0; len] }
}

#[tokio::test]
async fn test_upload_posts_file_part() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| {
            req.method == Method::POST
                && req.path == "/upload"
                && matches!(&req.payload, Payload::File(u) if u.content_type == "image/png")
        })
        .times(1)
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"file_id": "f1", "cloud_url": "https://cdn.test/f1.png"}"#.into(),
        }));

    let svc = ApiFileService { api: ApiClient::new(Arc::new(transport)) };
    let uploaded = svc.upload("tok", upload("image/png", 3)).await?;
    assert_eq!("f1", uploaded.file_id);
    Ok(())
}

#[test]
fn test_upload_checks() {
    assert_eq!(Ok(()), check_upload(&upload("image/jpeg", 10), MediaKind::Image));
    assert_eq!(Err("Please upload an image file"), check_upload(&upload("video/mp4", 10), MediaKind::Image));
    assert_eq!(Err("Please upload a video file"), check_upload(&upload("image/png", 10), MediaKind::Video));
    assert_eq!(
        Err("Video size must be less than 100MB"),
        check_upload(&upload("video/mp4", MAX_VIDEO_BYTES + 1), MediaKind::Video)
    );
}

#[tokio::test]
async fn test_media_skips_missing_files() -> anyhow::Result<()> {
    let mut svc = MockFileService::new();
    svc.expect_get_file().returning(|_, id| match id {
        "img" => Ok(FileRecord {
            file_id: "img".into(),
            cloud_url: Some("https://cdn.test/img.png".into()),
            file_type: Some("image/png".into()),
            ..Default::default()
        }),
        "vid" => Ok(FileRecord {
            file_id: "vid".into(),
            cloud_url: Some("https://cdn.test/vid.mp4".into()),
            file_type: Some("video/mp4".into()),
            ..Default::default()
        }),
        _ => Err(Error::ApiError(api::error::Error::StatusCodeFetchError(StatusCode::NOT_FOUND, String::new()))),
    });
    let svc: DynFileService = Arc::new(svc);

    let ids = vec!["img".to_string(), "gone".to_string(), "vid".to_string()];
    let media = media(&svc, "tok", &ids).await;

    assert_eq!(2, media.len());
    assert_eq!(MediaKind::Image, media[0].kind);
    assert_eq!(MediaKind::Video, media[1].kind);
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Probe {
    name: String,
    price: String,
}

#[test]
fn test_multipart_form_splits_fields_and_files() -> anyhow::Result<()> {
    let mut form = MultipartForm::default();
    form.insert("name", "Camera");
    form.insert("unknown", "x");
    form.push_file("images", upload("image/png", 1));
    form.push_file("video", upload("video/mp4", 1));
    form.push_file("images", upload("image/jpeg", 1));

    let probe: Probe = form.fields()?;
    assert_eq!("Camera", probe.name);
    assert_eq!("", probe.price);

    let images = form.take_files("images");
    assert_eq!(2, images.len());
    assert_eq!("image/jpeg", images[1].content_type);
    assert_eq!(1, form.take_files("video").len());
    assert!(form.take_files("images").is_empty());
    Ok(())
}
