// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ocat_core::{CatalogItem, CollectionView, DetectorState, Transition};

/// Maximum line width for wrapped text content (excluding 4-space indent).
const WRAP_WIDTH: usize = 96;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub const MANUAL_NOTICE: &str =
    "Live updates unavailable. Press r to refresh, t to retry the connection.";

/// Wrap text at word boundaries if it's a single line.
///
/// - If content contains newlines: return as-is (preserve user formatting)
/// - If content is single line >width: wrap at word boundaries
/// - If content is single line <=width: return as-is
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// One-line summary used in lists.
///
/// ```text
/// - 2026-01-01 10:30  a1b2c3: Desk lamp
/// ```
pub fn format_item_line(item: &CatalogItem) -> String {
    format!(
        "- {}  {}: {}",
        item.created_at.format(TIME_FORMAT),
        item.id,
        item.title
    )
}

/// Multi-line details for `show`.
pub fn format_item_details(item: &CatalogItem) -> String {
    let mut output = vec![
        format!("[{}] {}", item.id, item.title),
        format!("Created: {}", item.created_at.format(TIME_FORMAT)),
        format!("Image: {}", item.image_url),
    ];

    if !item.description.trim().is_empty() {
        output.push(String::new());
        output.push("Description:".to_string());
        for line in wrap_text(&item.description, WRAP_WIDTH).lines() {
            output.push(format!("    {}", line));
        }
    }

    output.join("\n")
}

/// The whole list, or a placeholder when it is empty.
pub fn format_view(view: &CollectionView) -> String {
    if view.is_empty() {
        return "(no objects)".to_string();
    }
    view.items()
        .iter()
        .map(format_item_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Status line announcing a mode change.
pub fn format_transition(transition: &Transition) -> String {
    match transition.to {
        DetectorState::Live => "● live".to_string(),
        DetectorState::Manual => format!("○ manual: {}", MANUAL_NOTICE),
        DetectorState::Connecting => "… connecting".to_string(),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
