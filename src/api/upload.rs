use std::collections::HashMap;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::api::errors::ApiError;

/// File part of a multipart form.
#[derive(Debug)]
pub(crate) struct UploadedFile {
    pub(crate) filename: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Multipart form with at most one `file` part plus plain text fields.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Reads the whole form. The `file` part is rejected once it grows past `max_bytes`.
    pub(crate) async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type =
                    field.content_type().unwrap_or("application/octet-stream").to_string();

                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(ApiError::BadRequest(format!(
                            "File size exceeds {}MB limit",
                            max_bytes / (1024 * 1024)
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                form.file = Some(UploadedFile { filename, content_type, bytes });
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest(format!("Invalid field '{name}'")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    pub(crate) fn require_file(&mut self) -> Result<UploadedFile, ApiError> {
        match self.file.take() {
            Some(file) if !file.bytes.is_empty() => Ok(file),
            _ => Err(ApiError::BadRequest("File is required".to_string())),
        }
    }

    pub(crate) fn uuid_field(&self, name: &str) -> Result<Uuid, ApiError> {
        let value = self
            .fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))?;

        Uuid::parse_str(value)
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a valid UUID")))
    }
}
