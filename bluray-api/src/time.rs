/// Parse a `HH:MM:SS` (optionally `HH:MM:SS.mmm`) string to whole seconds
///
/// Fractional seconds are truncated. Returns `None` for anything else,
/// including the `NOT_IMPLEMENTED` token some firmware reports and hour
/// counts too large to represent in seconds.
pub fn parse_time_to_secs(time_str: &str) -> Option<u64> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds = match parts[2].split_once('.') {
        Some((whole, fraction)) => {
            if !fraction.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            whole.parse::<u64>().ok()?
        }
        None => parts[2].parse::<u64>().ok()?,
    };

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)
}
