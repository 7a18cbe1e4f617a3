//! Asset filename generation and parsing.
//!
//! Destination filenames are the upload timestamp in ISO-8601 with characters
//! unsafe for filenames substituted (`:` becomes `-`), at millisecond
//! precision, plus the original extension. Lexicographic order of filenames
//! therefore equals chronological order within a partition.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout inside asset filenames, e.g. `2026-08-25T14-03-07.412Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3fZ";

/// Build the destination filename for an upload at `at` with `extension`
/// (lowercase, no dot).
pub fn asset_filename(at: DateTime<Utc>, extension: &str) -> String {
    format!("{}.{}", at.format(TIMESTAMP_FORMAT), extension)
}

/// Recover the upload timestamp encoded in an asset filename, if it follows
/// the generated layout. Used for display; the filesystem creation time stays
/// the canonical retention clock.
pub fn parse_asset_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    let (stem, _extension) = filename.rsplit_once('.')?;
    NaiveDateTime::parse_from_str(stem, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filename_round_trip() {
        let at = Utc.with_ymd_and_hms(2026, 8, 25, 14, 3, 7).unwrap()
            + chrono::Duration::milliseconds(412);
        let name = asset_filename(at, "mp4");
        assert_eq!(name, "2026-08-25T14-03-07.412Z.mp4");
        assert_eq!(parse_asset_timestamp(&name), Some(at));
    }

    #[test]
    fn test_filename_has_no_unsafe_characters() {
        let name = asset_filename(Utc::now(), "webm");
        assert!(!name.contains(':'));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_lexicographic_order_is_chronological() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(asset_filename(earlier, "mp4") < asset_filename(later, "mp4"));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert_eq!(parse_asset_timestamp("holiday.mp4"), None);
        assert_eq!(parse_asset_timestamp("no-extension"), None);
    }
}
