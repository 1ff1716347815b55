//! Create-endpoint input: multipart form fields when a file is attached,
//! otherwise a JSON object body.

use std::collections::HashMap;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct Payload {
    fields: Map<String, Value>,
    files: HashMap<String, UploadedFile>,
}

impl Payload {
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                files: HashMap::new(),
            }),
            _ => Err(AppError::bad_request("Invalid JSON")),
        }
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }

    /// Trimmed text value; blank and null count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        let value = match self.fields.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }

    pub fn text_or_default(&self, key: &str) -> String {
        self.text(key).unwrap_or_default()
    }

    /// Present-and-non-blank text, or `"<Label> is required"`.
    pub fn require(&self, key: &str, label: &str) -> AppResult<String> {
        self.text(key)
            .ok_or_else(|| AppError::bad_request(format!("{label} is required")))
    }

    pub fn require_file(&self, key: &str, label: &str) -> AppResult<&UploadedFile> {
        self.file(key)
            .ok_or_else(|| AppError::bad_request(format!("{label} is required")))
    }

    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key)
    }

    /// Checkbox-style flag: JSON `true`, or one of `true`/`on`/`1`/`yes`.
    pub fn flag(&self, key: &str) -> bool {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(_) => matches!(
                self.text(key).map(|v| v.to_ascii_lowercase()).as_deref(),
                Some("true" | "on" | "1" | "yes")
            ),
            None => false,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let invalid = |_| AppError::bad_request("Invalid form data");
        let mut payload = Payload::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };
            match field.file_name().map(String::from) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(invalid)?;
                    // Browsers send an empty part when no file was chosen.
                    if bytes.is_empty() {
                        continue;
                    }
                    payload.files.insert(
                        name,
                        UploadedFile {
                            filename: (!filename.is_empty()).then_some(filename),
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(invalid)?;
                    payload.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(payload)
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| AppError::bad_request("Invalid form data"))?;
            return Payload::from_multipart(multipart).await;
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::bad_request("Invalid JSON"))?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid JSON"))?;
        Payload::from_json(value)
    }
}
