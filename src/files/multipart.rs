use std::collections::HashMap;

use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use crate::api::Upload;

use super::error::Result;

///
/// A `multipart/form-data` submission read into memory: text inputs by
/// name, and the files chosen for each file input. File inputs left
/// empty by the browser are dropped.
///
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, Upload)>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.push_file(&name, Upload { file_name, content_type, bytes: bytes.to_vec() });
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.insert(&name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn push_file(&mut self, name: &str, upload: Upload) {
        self.files.push((name.to_string(), upload));
    }

    /// The text inputs as a typed form; inputs it does not know are ignored
    pub fn fields<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(serde_json::to_value(&self.fields)?)
    }

    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = kept;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }
}
