//! Portfolio record types and where each one is stored.

pub mod certification;
pub mod project;
pub mod skill;
pub mod timeline;

pub use certification::Certification;
pub use project::Project;
pub use skill::{Category, KeySkill, Skill};
pub use timeline::TimelineEvent;

use crate::store::DocRef;

/// Collection holding every portfolio document
pub const PORTFOLIO: &str = "portfolio";

/// Document and array field backing one collection store
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub document: &'static str,
    pub field: &'static str,
}

impl Location {
    pub fn doc_ref(&self) -> DocRef {
        DocRef::new(PORTFOLIO, self.document)
    }
}

pub const PROJECTS: Location = Location { document: "projects", field: "projects" };
pub const CERTIFICATIONS: Location = Location { document: "certifications", field: "certifications" };
pub const CATEGORIES: Location = Location { document: "skills", field: "categories" };
pub const KEY_SKILLS: Location = Location { document: "skills", field: "keySkills" };
pub const TIMELINE: Location = Location { document: "timeline", field: "events" };
