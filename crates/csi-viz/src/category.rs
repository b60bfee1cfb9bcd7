//! Categorical axes on top of a continuous coordinate.
//!
//! Category `i` sits at position `i as f64` and the axis spans half a slot
//! on either side, so bars, boxes and violins can be drawn at fractional
//! offsets around each slot. Labels are only printed on integer positions.

use std::ops::Range;

pub(crate) fn category_axis(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Tick budget that puts a key point on every half slot.
pub(crate) fn category_ticks(n: usize) -> usize {
    2 * n + 1
}

pub(crate) fn category_label(labels: &[String], position: f64) -> String {
    let idx = position.round();
    if idx < 0.0 || (position - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_at_integer_positions() {
        let labels = vec!["false".to_string(), "true".to_string()];
        assert_eq!(category_label(&labels, 0.0), "false");
        assert_eq!(category_label(&labels, 1.0), "true");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn axis_spans_half_slots() {
        assert_eq!(category_axis(3), -0.5..2.5);
        assert_eq!(category_axis(1), -0.5..0.5);
        assert_eq!(category_ticks(3), 7);
    }
}
