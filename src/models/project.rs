use serde::{Deserialize, Serialize};

use crate::collection::{entity::require_non_empty, CollectionError, Entity, RecordMeta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_url: String,
}

impl Entity for Project {
    const KIND: &'static str = "project";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.link = self.link.trim().to_string();
    }

    fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("title", &self.title, "Please enter a project title")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_form_is_camel_case_and_flat() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "title": "Site",
            "imageUrl": "https://cdn/x.png",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(project.meta.id, "p1");
        assert_eq!(project.image_url, "https://cdn/x.png");

        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["imageUrl"], "https://cdn/x.png");
        assert_eq!(value["id"], "p1");
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let project: Project = serde_json::from_value(json!({"title": "  "})).unwrap();
        assert!(matches!(project.validate(), Err(CollectionError::Validation { .. })));
    }
}
