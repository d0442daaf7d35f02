/// DOM element ids the page provides for the canvas and the status overlay.
///
/// Every overlay element is optional; missing ones are skipped silently.
pub const CANVAS_ID: &str = "zen-canvas";

// Status overlay
pub const STATUS_OVERLAY_ID: &str = "status-overlay";
pub const STATUS_TEXT_ID: &str = "status-text";
pub const LOADING_ID: &str = "loading-indicator";
pub const ERROR_PANEL_ID: &str = "error-panel";
pub const ERROR_TEXT_ID: &str = "error-text";
pub const RETRY_BUTTON_ID: &str = "retry-button";
pub const DEGRADED_BADGE_ID: &str = "degraded-badge";

// Shown when the hand tracker reports a per-frame failure
pub const TRACKER_WARNING_ID: &str = "tracker-warning";
