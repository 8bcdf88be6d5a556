const SPEED_UNITS: &[&str] = &["B/s", "KB/s", "MB/s", "GB/s"];

const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// Format a byte rate on a binary ladder, e.g. `1.23 MB/s`.
///
/// Rates beyond the gigabyte range stay in GB/s.
pub fn format_human_readable_speed(bytes_per_second: f64) -> String {
    let mut value = bytes_per_second;
    let mut unit_idx = 0;

    while value >= 1024.0 && unit_idx < SPEED_UNITS.len() - 1 {
        value /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", value, SPEED_UNITS[unit_idx])
}

pub fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEGABYTE
}
