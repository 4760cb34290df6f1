use serde::{Deserialize, Serialize};

use crate::collection::{entity::require_non_empty, CollectionError, Entity, RecordMeta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub issuer: String,
    /// Issue date as entered (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
}

impl Entity for Certification {
    const KIND: &'static str = "certification";

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
        self.issuer = self.issuer.trim().to_string();
    }

    fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("title", &self.title, "Please enter a certification title")?;
        require_non_empty("issuer", &self.issuer, "Please enter an issuer")
    }
}
