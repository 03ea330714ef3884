//! Human-readable file sizes (decimal units)

use serde::Serialize;

/// A unit of file size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub unit: &'static str,
    pub short: &'static str,
    /// Number of bytes in one unit
    pub value: u64,
}

/// Units of file size, up to terabytes
pub const UNITS: [Unit; 5] = [
    Unit { unit: "bytes", short: "B", value: 1 },
    Unit { unit: "kilobytes", short: "KB", value: 1_000 },
    Unit { unit: "megabytes", short: "MB", value: 1_000_000 },
    Unit { unit: "gigabytes", short: "GB", value: 1_000_000_000 },
    Unit { unit: "terabytes", short: "TB", value: 1_000_000_000_000 },
];

/// Look up a unit by name
pub fn unit(name: &str) -> Option<Unit> {
    UNITS.iter().copied().find(|unit| unit.unit == name)
}

/// Largest unit in which `bytes` is at least one. Empty files are counted in
/// bytes, sizes beyond the largest unit stay in terabytes.
pub fn human_sensible_file_size(bytes: u64) -> (Unit, f64) {
    let unit = UNITS
        .iter()
        .copied()
        .find(|unit| (bytes >= unit.value || unit.value == 1) && bytes < 1000 * unit.value)
        .unwrap_or(UNITS[UNITS.len() - 1]);

    (unit, bytes as f64 / unit.value as f64)
}

/// Format a size with three significant digits, e.g. `1.50 KB`
pub fn format_human_sensible_file_size(bytes: u64) -> String {
    let (unit, value) = human_sensible_file_size(bytes);
    let order = if value > 0.0 { value.log10().floor() as i32 } else { 0 };
    let decimals = (2 - order).max(0) as usize;

    format!("{:.*} {}", decimals, value, unit.short)
}
