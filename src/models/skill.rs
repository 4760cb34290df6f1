use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{entity::require_non_empty, generate_key, CollectionError, Entity, RecordMeta};

pub const MAX_LEVEL: i64 = 100;

/// Names compare case-insensitively, Unicode included
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn check_level(level: i64) -> Result<(), CollectionError> {
    if !(0..=MAX_LEVEL).contains(&level) {
        return Err(CollectionError::validation(
            "level",
            "Skill level must be between 0 and 100",
        ));
    }
    Ok(())
}

/// A skill nested inside a [`Category`]; not stored on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Skill {
    pub fn new(name: impl Into<String>, level: i64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            level,
            created_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("name", &self.name, "Please enter a skill name")?;
        check_level(self.level)
    }

    pub fn same_name(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

/// Named group of skills; removing it removes every nested skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            skills: Vec::new(),
        }
    }

    pub fn same_name(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

impl Entity for Category {
    const KIND: &'static str = "skill category";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn label(&self) -> &str {
        &self.name
    }

    /// Nested skills that predate per-skill ids get one here
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        let now = Utc::now();
        for skill in &mut self.skills {
            skill.name = skill.name.trim().to_string();
            if skill.id.is_empty() {
                skill.id = generate_key(now);
                skill.created_at.get_or_insert(now);
            }
        }
    }

    fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("name", &self.name, "Please enter a category name")?;
        for (index, skill) in self.skills.iter().enumerate() {
            skill.validate()?;
            if self.skills[..index].iter().any(|earlier| earlier.same_name(&skill.name)) {
                return Err(CollectionError::validation("name", "Skill already exists"));
            }
        }
        Ok(())
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.same_name(&other.name)
    }

    fn managed_fields() -> &'static [&'static str] {
        &["skills"]
    }
}

/// Headline skill shown apart from the categorised list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySkill {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
}

impl KeySkill {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
        }
    }
}

impl Entity for KeySkill {
    const KIND: &'static str = "key skill";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn validate(&self) -> Result<(), CollectionError> {
        require_non_empty("name", &self.name, "Please enter a skill name")
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        same_name(&self.name, &other.name)
    }
}
