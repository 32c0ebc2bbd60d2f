//! Counters for mapping fallbacks and session updates.
//!
//! Recording is a no-op until a recorder is installed (the replay binary
//! installs the Prometheus one when `METRICS_ENABLED` is set).

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const BOXES_MAPPED_TOTAL: &str = "overlay_boxes_mapped_total";
    pub const NOT_LAID_OUT_TOTAL: &str = "overlay_not_laid_out_total";
    pub const UNKNOWN_ROTATION_TOTAL: &str = "overlay_unknown_rotation_total";
    pub const ROTATION_CHANGES_TOTAL: &str = "overlay_rotation_changes_total";
    pub const ENTITIES_SKIPPED_TOTAL: &str = "overlay_entities_skipped_total";
}

/// Record a box successfully projected onto the overlay.
pub fn record_box_mapped() {
    counter!(names::BOXES_MAPPED_TOTAL).increment(1);
}

/// Record a pass-through because the overlay had no size yet.
pub fn record_not_laid_out() {
    counter!(names::NOT_LAID_OUT_TOTAL).increment(1);
}

/// Record an out-of-range relative rotation.
pub fn record_unknown_rotation() {
    counter!(names::UNKNOWN_ROTATION_TOTAL).increment(1);
}

/// Record a session replaced after a display rotation.
pub fn record_rotation_change() {
    counter!(names::ROTATION_CHANGES_TOTAL).increment(1);
}

/// Record an entity dropped during overlay dispatch.
pub fn record_entity_skipped(kind: &'static str, reason: &'static str) {
    counter!(names::ENTITIES_SKIPPED_TOTAL, "kind" => kind, "reason" => reason).increment(1);
}
