use retrobot_core::domain::RetroItem;
use serde::{Deserialize, Serialize};

/// One row of the items table, identity assigned by the store on creation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(default)]
    pub fields: ItemFields,
}

/// Field payload for the items table. Serde renames match the store's column
/// names exactly; `Reviewed At` stays absent until the sweep sets it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Object", default)]
    pub object: String,
    #[serde(rename = "Creator", default)]
    pub creator: String,
    #[serde(rename = "Created At", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "Reviewed At", default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

impl ItemFields {
    pub fn to_domain(&self) -> RetroItem {
        RetroItem {
            category: self.category.clone(),
            object: self.object.clone(),
            creator: self.creator.clone(),
            created_at: self.created_at.clone(),
            reviewed_at: self.reviewed_at.clone(),
        }
    }
}

/// Response envelope of a table read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<ItemRecord>,
}

/// Update payload marking a record as reviewed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewPatch {
    #[serde(rename = "Reviewed At")]
    pub reviewed_at: String,
}

#[cfg(test)]
mod tests {
    use super::{ItemFields, RecordPage, ReviewPatch};

    #[test]
    fn fields_serialize_with_store_column_names_and_omit_unset_timestamps() {
        let fields = ItemFields {
            category: "good".to_owned(),
            object: "Pairing went well".to_owned(),
            creator: "alice".to_owned(),
            created_at: Some("2026-08-05T10:00:00.000Z".to_owned()),
            reviewed_at: None,
        };

        let value = serde_json::to_value(&fields).expect("fields should serialize");
        assert_eq!(value["Category"], "good");
        assert_eq!(value["Object"], "Pairing went well");
        assert_eq!(value["Creator"], "alice");
        assert_eq!(value["Created At"], "2026-08-05T10:00:00.000Z");
        assert!(
            value.get("Reviewed At").is_none(),
            "unset reviewed timestamp must not appear on the wire"
        );
    }

    #[test]
    fn record_page_deserializes_store_read_responses() {
        let page: RecordPage = serde_json::from_str(
            r#"{
                "records": [
                    {"id": "rec1", "fields": {"Category": "try", "Object": "Shorter standups", "Creator": "bob"}}
                ]
            }"#,
        )
        .expect("page should deserialize");

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "rec1");
        assert_eq!(page.records[0].fields.category, "try");
        assert_eq!(page.records[0].fields.reviewed_at, None);
    }

    #[test]
    fn empty_page_deserializes_without_records_key() {
        let page: RecordPage = serde_json::from_str("{}").expect("empty page should deserialize");
        assert!(page.records.is_empty());
    }

    #[test]
    fn review_patch_targets_the_reviewed_at_column() {
        let patch = ReviewPatch { reviewed_at: "2026-08-05T11:30:00.000Z".to_owned() };
        let value = serde_json::to_value(&patch).expect("patch should serialize");
        assert_eq!(value["Reviewed At"], "2026-08-05T11:30:00.000Z");
        assert_eq!(value.as_object().map(|fields| fields.len()), Some(1));
    }
}
