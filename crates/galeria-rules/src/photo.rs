//! Photo attachment checks, applied when a file is picked or dropped.

use galeria_core::{PhotoAttachment, ValidationResult};

use crate::messages::Locale;

/// Largest accepted photo, in megabytes
pub const MAX_PHOTO_MB: usize = 10;
/// Largest accepted photo, in bytes
pub const MAX_PHOTO_BYTES: usize = MAX_PHOTO_MB * 1024 * 1024;

pub fn validate_photo(photo: &PhotoAttachment, locale: Locale) -> ValidationResult {
    if !photo.content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return ValidationResult::invalid(locale.photo_not_image());
    }
    if photo.size() > MAX_PHOTO_BYTES {
        return ValidationResult::invalid(locale.photo_too_large(MAX_PHOTO_MB));
    }
    ValidationResult::ok()
}
