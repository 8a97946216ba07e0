// One read or write per backend resource, all as methods on `TripfferClient`

mod accounts;
mod bookings;
mod favorites;
mod hotels;
mod reviews;
mod rooms;

pub use accounts::{Credentials, HotelRegistration, PasswordChange, ProfileUpdate, Registration};
pub use bookings::BookingRequest;
pub use favorites::FavoriteToggle;
pub use hotels::{HotelUpdate, SearchParams};
pub use reviews::ReviewRequest;
pub use rooms::RoomPayload;

use crate::error::ApiError;
use crate::transport::FormPart;
use bytes::Bytes;
use std::path::Path;

// A file picked for a multipart upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::ClientError(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, data))
    }

    pub(crate) fn to_part(&self, field: &str) -> FormPart {
        FormPart::file(field, &self.file_name, &self.content_type, self.data.clone())
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
