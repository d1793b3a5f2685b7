use validator::{Validate, ValidationErrors};

use crate::api::errors::ApiError;
use crate::services::object_keys;

pub(crate) const MIN_USERNAME_LEN: usize = 3;
const MAX_PHONE_DIGITS: usize = 15;

/// Runs the derived validator and turns the first failing message into a 400.
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| ApiError::BadRequest(first_message(&errors)))
}

fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(left, _), (right, _)| left.cmp(right));
    fields
        .iter()
        .find_map(|(field, list)| {
            list.first().map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .unwrap_or_else(|| errors.to_string())
}

/// E.164 style number: optional `+`, a non-zero leading digit, 2 to 15 digits in total.
pub(crate) fn validate_phone_number(phone: &str) -> Result<(), ApiError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=MAX_PHONE_DIGITS).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid phone number format".to_string()))
    }
}

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.chars().count() >= MIN_USERNAME_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_image_upload(
    filename: &str,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let extension = object_keys::extension(filename)
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")));
    }

    let mime = content_type.trim().to_ascii_lowercase();
    if mime_allowed_for_extension(&mime, &extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "MIME type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

/// Audio uploads are stored as MP3; anything that is not audio is rejected.
pub(crate) fn validate_audio_upload(content_type: &str) -> Result<(), ApiError> {
    let mime = content_type.trim().to_ascii_lowercase();
    if mime.starts_with("audio/") || mime == "application/octet-stream" {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("MIME type '{mime}' is not an audio type")))
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    match extension {
        "jpg" | "jpeg" => matches!(mime, "image/jpeg" | "image/jpg"),
        "png" => mime == "image/png",
        "webp" => mime == "image/webp",
        "gif" => mime == "image/gif",
        _ => false,
    }
}
