//! Buffered multipart forms

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::{ApiError, ApiResult};

/// One field of a multipart form
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// A multipart form read into memory
#[derive(Debug, Clone, Default)]
pub struct Form {
    parts: Vec<FormPart>,
}

impl Form {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut parts = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid form field {}: {}", name, e)))?;

            parts.push(FormPart {
                name,
                file_name,
                data,
            });
        }

        Ok(Self { parts })
    }

    /// First part with the given name
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// A part that must be present
    pub fn require(&self, name: &str) -> ApiResult<&FormPart> {
        self.get(name)
            .ok_or_else(|| ApiError::BadRequest(format!("No {} provided", name)))
    }

    /// A text field, if present
    pub fn text(&self, name: &str) -> ApiResult<Option<String>> {
        self.get(name)
            .map(|part| {
                String::from_utf8(part.data.to_vec())
                    .map_err(|_| ApiError::BadRequest(format!("Field {} is not text", name)))
            })
            .transpose()
    }
}
