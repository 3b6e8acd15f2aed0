//! Extraction of the `data` + `images` multipart form used by create and update.

use axum::extract::Multipart;
use pereval_core::image_store::UploadedImage;

use crate::error::{AppError, AppResult};

/// Form field carrying the JSON payload.
const DATA_FIELD: &str = "data";

/// Accepted names for image file fields, in either bare or PHP-style list form.
const IMAGE_FIELDS: &[&str] = &["images", "images[]"];

/// Payload used when the form carries no `data` field at all.
const EMPTY_PAYLOAD: &str = "{}";

/// The parts of a submission form, in upload order.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub data: Option<String>,
    pub images: Vec<UploadedImage>,
}

impl SubmissionForm {
    /// The JSON payload, or an empty object so validation reports the missing fields.
    pub fn payload(&self) -> &str {
        self.data.as_deref().unwrap_or(EMPTY_PAYLOAD)
    }
}

/// Read every field of the multipart body, keeping `data` and image files.
pub async fn read_submission_form(multipart: &mut Multipart) -> AppResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == DATA_FIELD {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.data = Some(text);
        } else if IMAGE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.images.push(UploadedImage {
                file_name,
                bytes: bytes.to_vec(),
            });
        }
    }

    tracing::debug!(
        has_data = form.data.is_some(),
        images = form.images.len(),
        "Read submission form",
    );

    Ok(form)
}
