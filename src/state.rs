use std::sync::Arc;
use tracing::info;

use crate::activity::{ActivityFeed, ActivityKind, CollectionActivity, CommitHistorySource, SkillActivity};
use crate::auth::{AuthGate, AuthProvider, OwnerAuthProvider};
use crate::blob::BlobStore;
use crate::config::AppConfig;
use crate::services::Portfolio;
use crate::store::DocumentStore;

/// Shared handles for every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub documents: Arc<dyn DocumentStore>,
    pub portfolio: Arc<Portfolio>,
    pub auth: Arc<dyn AuthProvider>,
    pub gate: AuthGate,
    pub blobs: Arc<dyn BlobStore>,
    pub activity: Arc<ActivityFeed>,
}

impl AppState {
    pub fn new(config: AppConfig, documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let portfolio = Arc::new(Portfolio::new(documents.clone()));
        let auth: Arc<dyn AuthProvider> = Arc::new(OwnerAuthProvider::new(&config.security));
        let gate = AuthGate::new(config.security.login_route.clone());
        let activity = Arc::new(activity_feed(&config, &portfolio));

        Self {
            config: Arc::new(config),
            documents,
            portfolio,
            auth,
            gate,
            blobs,
            activity,
        }
    }
}

fn activity_feed(config: &AppConfig, portfolio: &Portfolio) -> ActivityFeed {
    let mut feed = ActivityFeed::new(config.api.feed_limit)
        .with_source(Arc::new(CollectionActivity::new(ActivityKind::Project, portfolio.projects.clone())))
        .with_source(Arc::new(CollectionActivity::new(
            ActivityKind::Certification,
            portfolio.certifications.clone(),
        )))
        .with_source(Arc::new(CollectionActivity::new(ActivityKind::Timeline, portfolio.timeline.clone())))
        .with_source(Arc::new(SkillActivity::new(portfolio.skills.categories_store().clone())));

    match CommitHistorySource::from_config(&config.github, config.api.feed_limit) {
        Some(commits) => feed = feed.with_source(Arc::new(commits)),
        None => info!("No GitHub repository configured, activity feed without commits"),
    }
    feed
}
