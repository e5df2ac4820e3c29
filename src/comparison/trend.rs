use crate::models::{TestValue, Trend};

/// Changes smaller than this percentage of the previous value are "stable".
pub const STABLE_THRESHOLD_PERCENT: f64 = 5.0;

/// Direction of change between two adjacent columns.
///
/// Purely numeric: "up" means the number grew, whether or not that is
/// clinically better.
pub fn compute_trend(current: Option<&TestValue>, previous: Option<&TestValue>) -> Trend {
    let (Some(curr), Some(prev)) = (
        current.and_then(TestValue::as_number),
        previous.and_then(TestValue::as_number),
    ) else {
        return Trend::None;
    };

    let diff = curr - prev;
    let percent_change = if prev != 0.0 {
        diff.abs() / prev.abs() * 100.0
    } else {
        0.0
    };

    if percent_change < STABLE_THRESHOLD_PERCENT {
        Trend::Stable
    } else if diff > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}
