//! Cell metrics shared by `CropResolver` and both renderers. Fixed design
//! constants, not measured from any installed font — picking our own and
//! using them consistently is what keeps crop math and animation hit-testing
//! self-consistent, per spec section 4.6.

pub const CELL_WIDTH: f64 = 8.4;
pub const CELL_HEIGHT: f64 = 18.0;
pub const FONT_SIZE: f64 = 14.0;
pub const BASELINE_OFFSET: f64 = 14.0;

/// Format a float with up to three fractional digits, trimming trailing
/// zeros (and a bare trailing dot) so output stays compact.
pub fn fmt_num(v: f64) -> String {
    let s = format!("{v:.3}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(12.340), "12.34");
        assert_eq!(fmt_num(0.0), "0");
    }
}
