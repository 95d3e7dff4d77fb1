const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

/// Whether `filename` has a known image extension (case-insensitive).
pub fn is_image_file(filename: &str) -> bool {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

/// Splits a millisecond duration into whole hours, minutes and seconds.
pub fn split_millis(millis: u64) -> Hms {
    let total_seconds = millis / 1000;
    let total_minutes = total_seconds / 60;
    Hms {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
        seconds: total_seconds % 60,
    }
}
