use std::path::Path;

use uuid::Uuid;

pub(crate) const DEFAULT_FOLDER: &str = "uploads";

/// Keeps ASCII alphanumerics, dots, underscores and dashes.
pub(crate) fn sanitized_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Lowercased extension including the leading dot, or an empty string.
pub(crate) fn dotted_extension(name: &str) -> String {
    extension(name).map(|ext| format!(".{ext}")).unwrap_or_default()
}

pub(crate) fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

pub(crate) fn image_content_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Normalizes a client supplied folder into `a/b/c` form. Returns `None` for traversal attempts
/// or characters outside `[A-Za-z0-9_-]`.
pub(crate) fn sanitized_folder(folder: Option<&str>) -> Option<String> {
    let raw = folder.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(DEFAULT_FOLDER);

    let segments: Vec<&str> = raw.split('/').filter(|segment| !segment.is_empty()).collect();
    if segments.is_empty() {
        return Some(DEFAULT_FOLDER.to_string());
    }

    let valid = segments.iter().all(|segment| {
        *segment != ".."
            && segment.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    });

    valid.then(|| segments.join("/"))
}

pub(crate) fn user_image_key(user_id: Uuid, filename: &str) -> String {
    format!("user-images/{user_id}-{}{}", Uuid::new_v4(), dotted_extension(filename))
}

pub(crate) fn section_audio_key(filename: &str) -> String {
    format!("sections/{}-{}", Uuid::new_v4(), sanitized_filename(filename))
}

pub(crate) fn group_image_key(filename: &str) -> String {
    format!("question-groups/{}-{}", Uuid::new_v4(), sanitized_filename(filename))
}

pub(crate) fn presigned_key(folder: &str, filename: &str) -> String {
    format!("{folder}/{}{}", Uuid::new_v4(), dotted_extension(filename))
}
