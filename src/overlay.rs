use web_sys as web;
use zen_core::Status;

use crate::constants::*;

#[inline]
fn show(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
fn hide(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
fn set_visible(document: &web::Document, id: &str, visible: bool) {
    if visible {
        show(document, id);
    } else {
        hide(document, id);
    }
}

#[inline]
fn set_text(document: &web::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// Reflect the lifecycle status in the overlay elements.
pub fn render_status(document: &web::Document, status: &Status) {
    set_text(document, STATUS_TEXT_ID, &status.to_string());
    set_visible(document, LOADING_ID, *status == Status::Loading);
    set_visible(
        document,
        DEGRADED_BADGE_ID,
        *status == Status::Running { degraded: true },
    );

    let failure = match status {
        Status::Failed(msg) => Some(msg.as_str()),
        _ => None,
    };
    set_text(document, ERROR_TEXT_ID, failure.unwrap_or(""));
    set_visible(document, ERROR_PANEL_ID, failure.is_some());
    set_visible(document, RETRY_BUTTON_ID, failure.is_some());

    // The overlay only stays up while there is something to say
    let quiet = matches!(status, Status::Running { degraded: false });
    set_visible(document, STATUS_OVERLAY_ID, !quiet);
}

/// Show or clear the transient hand-tracking warning.
pub fn tracker_warning(document: &web::Document, message: Option<&str>) {
    set_text(document, TRACKER_WARNING_ID, message.unwrap_or(""));
    set_visible(document, TRACKER_WARNING_ID, message.is_some());
}
