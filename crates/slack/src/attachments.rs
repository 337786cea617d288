use std::collections::BTreeMap;

use retrobot_core::domain::{capitalize_object, Category, RetroItem};
use serde::Serialize;
use tracing::warn;

/// One presentation block per category: capitalized title, bulleted item
/// text, and the category's signal color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub title: String,
    pub text: String,
    pub color: String,
}

/// Well-formed data only carries the three known categories; anything else
/// reached the store out of band and gets a neutral color instead of a panic.
const FALLBACK_COLOR: &str = "#cccccc";

/// Group items by their stored category value (exact match), sort groups by
/// category name ascending, and keep each group's items in arrival order.
pub fn item_attachments(items: &[RetroItem]) -> Vec<Attachment> {
    let mut grouped: BTreeMap<&str, Vec<&RetroItem>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.category.as_str()).or_default().push(item);
    }

    grouped
        .into_iter()
        .map(|(category, members)| {
            let color = match Category::from_stored(category) {
                Some(known) => known.color().to_owned(),
                None => {
                    warn!(
                        event_name = "retro.attachments.unknown_category",
                        category, "stored item carries a category outside the known set"
                    );
                    FALLBACK_COLOR.to_owned()
                }
            };

            Attachment {
                title: capitalize_object(category),
                text: members
                    .iter()
                    .map(|item| format!("• {}", item.object))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                color,
            }
        })
        .collect()
}
