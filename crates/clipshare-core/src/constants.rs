//! Shared constants: allow-listed video formats and MIME handling.

/// File extensions accepted for upload, lowercase, without the leading dot.
pub const VIDEO_EXTENSIONS: [&str; 9] = [
    "mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "m4v", "3gp",
];

/// MIME prefix that marks a declared content type as video regardless of extension.
pub const VIDEO_MIME_PREFIX: &str = "video/";

/// Generic binary fallback many mobile clients send for video files.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// True if `extension` (lowercase, no dot) is an allow-listed video extension.
pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension)
}

/// Canonical extension for a declared video content type, the inverse of
/// `content_type_for_extension`. `None` for video types without an
/// allow-listed extension.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "video/x-msvideo" => Some("avi"),
        "video/x-ms-wmv" => Some("wmv"),
        "video/x-flv" => Some("flv"),
        "video/x-matroska" => Some("mkv"),
        "video/3gpp" => Some("3gp"),
        _ => None,
    }
}

/// Content type to serve for a stored asset, derived from its extension.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mkv" => "video/x-matroska",
        "3gp" => "video/3gpp",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_membership() {
        assert!(is_video_extension("mp4"));
        assert!(is_video_extension("3gp"));
        assert!(!is_video_extension("exe"));
        assert!(!is_video_extension("MP4")); // callers must lowercase first
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for_extension("mp4"), "video/mp4");
        assert_eq!(content_type_for_extension("mkv"), "video/x-matroska");
        assert_eq!(content_type_for_extension("bin"), OCTET_STREAM);
    }

    #[test]
    fn test_content_type_inverse_yields_allow_listed_extensions() {
        assert_eq!(extension_for_content_type("video/mp4"), Some("mp4"));
        assert_eq!(extension_for_content_type("video/quicktime"), Some("mov"));
        assert_eq!(extension_for_content_type("video/ogg"), None);
        for ext in VIDEO_EXTENSIONS {
            if let Some(mapped) = extension_for_content_type(content_type_for_extension(ext)) {
                assert!(is_video_extension(mapped));
            }
        }
    }
}
