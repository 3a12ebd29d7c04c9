//! Shared key generation for storage backends.
//!
//! Key format: `{YYYY}/{MM}/{DD}/{base}_{unix_nanos}{ext}`, dated by local
//! wall-clock time at upload.

use chrono::{DateTime, Local, TimeZone};

/// Generate a storage key for `original_name` at the current time.
pub fn generate_object_key(original_name: &str) -> String {
    object_key_at(original_name, &Local::now())
}

/// Generate the storage key for `original_name` as of `now`.
///
/// Only the final path component of the name is used, so directory parts in a
/// client-supplied filename cannot steer the key. All backends must use this
/// format for consistency.
pub fn object_key_at<Tz: TimeZone>(original_name: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let (base, ext) = split_name(original_name);
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));

    format!("{}/{}_{}{}", now.format("%Y/%m/%d"), base, nanos, ext)
}

/// Split a filename into base name and extension (including the dot).
///
/// The extension starts at the last `.` of the final path component; a name
/// without a dot has an empty extension.
fn split_name(original_name: &str) -> (&str, &str) {
    let file_name = original_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_name);

    match file_name.rfind('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}
