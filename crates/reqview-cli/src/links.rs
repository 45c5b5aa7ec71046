//! Links from report rows to the procurement system.

/// Item page of a requisition; `{id}` takes the Corcentric id.
pub const DEFAULT_LINK_TEMPLATE: &str = "https://valeo.determine.com/t/ui/md/REQUESTID/item/{id}";

const PLACEHOLDER: &str = "{id}";

/// Fills `template` with `value`, or appends `value` when the template has
/// no placeholder. Blank values produce no link.
///
/// The value is inserted exactly as projected from the CSV.
pub fn link_for(template: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    if template.contains(PLACEHOLDER) {
        Some(template.replace(PLACEHOLDER, value))
    } else {
        Some(format!("{template}{value}"))
    }
}
