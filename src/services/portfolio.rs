use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::SkillBoard;
use crate::collection::{CollectionError, CollectionStore};
use crate::models::{
    Certification, Project, TimelineEvent, CATEGORIES, CERTIFICATIONS, KEY_SKILLS, PROJECTS, TIMELINE,
};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_skills: usize,
    pub total_certifications: usize,
    pub total_timeline_events: usize,
}

/// Every collection store of the portfolio, sharing one document store
pub struct Portfolio {
    pub projects: Arc<CollectionStore<Project>>,
    pub certifications: Arc<CollectionStore<Certification>>,
    pub timeline: Arc<CollectionStore<TimelineEvent>>,
    pub skills: SkillBoard,
}

impl Portfolio {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            projects: Arc::new(CollectionStore::new(documents.clone(), PROJECTS.doc_ref(), PROJECTS.field)),
            certifications: Arc::new(CollectionStore::new(
                documents.clone(),
                CERTIFICATIONS.doc_ref(),
                CERTIFICATIONS.field,
            )),
            timeline: Arc::new(CollectionStore::new(documents.clone(), TIMELINE.doc_ref(), TIMELINE.field)),
            skills: SkillBoard::new(
                Arc::new(CollectionStore::new(documents.clone(), CATEGORIES.doc_ref(), CATEGORIES.field)),
                Arc::new(CollectionStore::new(documents, KEY_SKILLS.doc_ref(), KEY_SKILLS.field)),
            ),
        }
    }

    /// Initial fetch of every mirror. Each store is attempted even when an
    /// earlier one fails; the first failure is returned.
    pub async fn load_all(&self) -> Result<(), CollectionError> {
        let results = [
            self.projects.load().await.map(|_| ()),
            self.certifications.load().await.map(|_| ()),
            self.timeline.load().await.map(|_| ()),
            self.skills.load().await,
        ];

        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                warn!("Initial load failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Portfolio mirrors loaded");
                Ok(())
            }
        }
    }

    pub async fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_projects: self.projects.len().await,
            total_skills: self.skills.total_skills().await,
            total_certifications: self.certifications.len().await,
            total_timeline_events: self.timeline.len().await,
        }
    }
}
