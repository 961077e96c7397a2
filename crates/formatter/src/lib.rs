//! # Formatter
//!
//! Renders one `AppointmentEvent` into an HTML-safe channel message.
//!
//! Pure and total: no state, no I/O, no failure mode. Absent optional
//! fields render as [`MISSING_FIELD`] instead of empty text, and every
//! free-text field is escaped before interpolation.

mod escape;

pub use escape::escape_html;

use contracts::{AppointmentEvent, SlotStatus};

/// Placeholder rendered for absent optional fields.
pub const MISSING_FIELD: &str = "n/a";

/// Render an event into an HTML message body.
pub fn render(event: &AppointmentEvent) -> String {
    let mut lines = Vec::with_capacity(8);
    lines.push(status_line(&event.status));
    lines.push(field_line("Center", event.center_name.as_deref()));
    lines.push(field_line("Country", event.country_code.as_deref()));
    lines.push(field_line("Mission", event.mission_code.as_deref()));
    lines.push(field_line("Category", event.category.as_deref()));
    lines.push(field_line("Type", event.visa_type.as_deref()));
    lines.push(field_line(
        "Last available",
        event.last_available_date.as_deref(),
    ));
    lines.push(format!(
        "Checked {} times, last at {}",
        event.check_count,
        event.last_checked_at.format("%Y-%m-%d %H:%M UTC"),
    ));
    lines.join("\n")
}

fn status_line(status: &SlotStatus) -> String {
    match status {
        SlotStatus::Open => "\u{1F7E2} <b>Slots available</b>".to_string(),
        SlotStatus::Closed => "\u{1F534} <b>Slots closed</b>".to_string(),
        SlotStatus::Other(raw) => format!("\u{26AA} <b>{}</b>", escape_html(raw)),
    }
}

fn field_line(label: &str, value: Option<&str>) -> String {
    match value {
        Some(text) => format!("<b>{label}:</b> {}", escape_html(text)),
        None => format!("<b>{label}:</b> {MISSING_FIELD}"),
    }
}
