//! Device status label to gauge value mapping.

/// Map a device-reported status label to the status gauge value.
///
/// Unknown labels (including "On") map to 0 rather than erroring.
pub fn status_gauge_value(status: &str) -> i64 {
    match status {
        "Idle" => 1,
        "Streaming" => 2,
        "Interrupted" => -1,
        _ => 0,
    }
}
