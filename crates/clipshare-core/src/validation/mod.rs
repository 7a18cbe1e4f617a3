//! Upload validation: decides whether an (original filename, declared content
//! type) pair is an acceptable video and which extension the stored asset
//! gets.

use crate::constants::{
    extension_for_content_type, is_video_extension, OCTET_STREAM, VIDEO_EXTENSIONS,
    VIDEO_MIME_PREFIX,
};
use crate::error::AppError;

/// Lowercased extension of `filename`, without the dot, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_stem, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Accept the upload if any of the following holds, in order:
/// 1. the filename extension is on the video allow-list;
/// 2. the declared content type starts with `video/` and maps to an
///    allow-listed extension;
/// 3. the content type is the generic binary fallback AND the extension is
///    allow-listed.
///
/// The OR-combination is deliberately lenient: mobile clients routinely
/// mislabel the content type of recorded video.
///
/// Returns the extension to use for the stored filename. The returned
/// extension is always on the allow-list, so an accepted upload is always
/// visible to the catalog and never carries path-unsafe characters.
pub fn validate_video_kind(original_filename: &str, content_type: &str) -> Result<String, AppError> {
    let extension = file_extension(original_filename);
    let mime = normalize_mime_type(content_type).to_ascii_lowercase();

    if let Some(ref ext) = extension {
        if is_video_extension(ext) {
            return Ok(ext.clone());
        }
    }

    if mime.starts_with(VIDEO_MIME_PREFIX) {
        // The original extension was absent or not allow-listed; derive the
        // stored extension from the declared type instead.
        if let Some(ext) = extension_for_content_type(&mime) {
            return Ok(ext.to_string());
        }
        let subtype = mime.trim_start_matches(VIDEO_MIME_PREFIX);
        if is_video_extension(subtype) {
            return Ok(subtype.to_string());
        }
        return Err(AppError::InvalidFileType(format!(
            "'{}' declares unsupported video type '{}' (allowed: {})",
            original_filename,
            mime,
            VIDEO_EXTENSIONS.join(", ")
        )));
    }

    if mime == OCTET_STREAM {
        // Covered by rule 1 already; reaching here means the extension was
        // absent or not allow-listed.
        return Err(AppError::InvalidFileType(format!(
            "'{}' with generic content type is not an allowed video format (allowed: {})",
            original_filename,
            VIDEO_EXTENSIONS.join(", ")
        )));
    }

    Err(AppError::InvalidFileType(format!(
        "'{}' ({}) is not an allowed video format (allowed: {})",
        original_filename,
        content_type,
        VIDEO_EXTENSIONS.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension_passes() {
        assert_eq!(
            validate_video_kind("clip.mp4", "video/mp4").unwrap(),
            "mp4"
        );
        assert_eq!(
            validate_video_kind("CLIP.MOV", "text/plain").unwrap(),
            "mov"
        );
    }

    #[test]
    fn test_video_mime_rescues_unknown_extension() {
        // The unknown extension is replaced, not kept: "tmp" is not on the
        // allow-list and a stored asset must always stay catalog-visible.
        assert_eq!(
            validate_video_kind("recording.tmp", "video/mp4").unwrap(),
            "mp4"
        );
        assert_eq!(validate_video_kind("blob", "video/webm").unwrap(), "webm");
        assert_eq!(
            validate_video_kind("blob", "video/quicktime").unwrap(),
            "mov"
        );
    }

    #[test]
    fn test_rescued_extension_is_always_allow_listed() {
        for (name, mime) in [
            ("recording.tmp", "video/mp4"),
            ("clip.ev/il", "video/mp4"),
            ("blob", "video/x-matroska"),
            ("movie.bak", "video/m4v"),
        ] {
            let ext = validate_video_kind(name, mime).unwrap();
            assert!(is_video_extension(&ext), "{} -> {}", name, ext);
        }
    }

    #[test]
    fn test_unmappable_video_subtype_is_rejected() {
        assert!(matches!(
            validate_video_kind("blob", "video/ogg"),
            Err(AppError::InvalidFileType(_))
        ));
        assert!(matches!(
            validate_video_kind("clip.raw", "video/vnd.dvb.file"),
            Err(AppError::InvalidFileType(_))
        ));
    }

    #[test]
    fn test_octet_stream_requires_allowed_extension() {
        assert_eq!(
            validate_video_kind("clip.mkv", "application/octet-stream").unwrap(),
            "mkv"
        );
        assert!(matches!(
            validate_video_kind("clip.txt", "application/octet-stream"),
            Err(AppError::InvalidFileType(_))
        ));
    }

    #[test]
    fn test_rejects_non_video() {
        assert!(matches!(
            validate_video_kind("notes.txt", "text/plain"),
            Err(AppError::InvalidFileType(_))
        ));
        assert!(matches!(
            validate_video_kind("malware.exe", "application/x-dosexec"),
            Err(AppError::InvalidFileType(_))
        ));
    }

    #[test]
    fn test_mime_parameters_are_stripped() {
        assert_eq!(
            validate_video_kind("blob", "video/webm; codecs=vp9").unwrap(),
            "webm"
        );
    }
}
