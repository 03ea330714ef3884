//! Colors for telling files apart in plots

/// CSS color for a hue in degrees
pub fn color_by_hue(hue: f64) -> String {
    format!("hsl({}, 70%, 50%)", hue)
}

/// Color of the `index`-th file; hues are spread by an irrational step so
/// neighbouring files never share a color.
pub fn palette_color(index: usize) -> String {
    let hue = (index as f64 * 30.0 * std::f64::consts::SQRT_2) % 360.0;
    color_by_hue(hue)
}
