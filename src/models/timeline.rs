use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{CollectionError, Entity, RecordMeta};

const MIN_YEAR: i32 = 1900;
const MAX_YEARS_AHEAD: i32 = 100;
const MIN_TITLE_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub year: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Entity for TimelineEvent {
    const KIND: &'static str = "timeline event";

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
        self.description = self.description.trim().to_string();
    }

    fn validate(&self) -> Result<(), CollectionError> {
        if self.year == 0 {
            return Err(CollectionError::validation("year", "Please enter a year"));
        }
        let latest = Utc::now().year() + MAX_YEARS_AHEAD;
        if self.year < MIN_YEAR || self.year > latest {
            return Err(CollectionError::validation(
                "year",
                "Please enter a valid year between 1900 and future 100 years",
            ));
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(CollectionError::validation("title", "Please enter a title"));
        }
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(CollectionError::validation(
                "title",
                "Title must be at least 3 characters long",
            ));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(CollectionError::validation("description", "Please enter a description"));
        }
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(CollectionError::validation(
                "description",
                "Description must be at least 10 characters long",
            ));
        }
        Ok(())
    }

    /// Most recent year first
    fn order(items: &mut [Self]) {
        items.sort_by(|a, b| b.year.cmp(&a.year));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(year: i32, title: &str, description: &str) -> TimelineEvent {
        TimelineEvent {
            meta: RecordMeta::default(),
            year,
            title: title.into(),
            description: description.into(),
        }
    }

    fn field_of(err: CollectionError) -> String {
        match err {
            CollectionError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validation_mirrors_form_rules() {
        assert!(event(2020, "Joined", "Started a new role").validate().is_ok());
        assert_eq!(field_of(event(0, "Joined", "Started a new role").validate().unwrap_err()), "year");
        assert_eq!(field_of(event(1850, "Joined", "Started a new role").validate().unwrap_err()), "year");
        assert_eq!(field_of(event(2020, "Jo", "Started a new role").validate().unwrap_err()), "title");
        assert_eq!(field_of(event(2020, "Joined", "too short").validate().unwrap_err()), "description");
    }

    #[test]
    fn orders_by_year_descending() {
        let mut items = vec![
            event(2019, "aaa", "0123456789"),
            event(2023, "bbb", "0123456789"),
            event(2021, "ccc", "0123456789"),
        ];
        TimelineEvent::order(&mut items);
        let years: Vec<_> = items.iter().map(|e| e.year).collect();
        assert_eq!(years, [2023, 2021, 2019]);
    }
}
