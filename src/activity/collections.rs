use async_trait::async_trait;
use std::sync::Arc;

use super::{ActivityEntry, ActivityError, ActivityKind, ActivitySource};
use crate::collection::{CollectionStore, Entity};
use crate::models::Category;

/// Creation and update entries scraped from one collection's mirror
pub struct CollectionActivity<T: Entity> {
    name: String,
    kind: ActivityKind,
    store: Arc<CollectionStore<T>>,
}

impl<T: Entity> CollectionActivity<T> {
    pub fn new(kind: ActivityKind, store: Arc<CollectionStore<T>>) -> Self {
        Self {
            name: format!("{}.{}", store.doc(), store.field()),
            kind,
            store,
        }
    }
}

fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl<T: Entity> ActivitySource for CollectionActivity<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<ActivityEntry>, ActivityError> {
        let noun = capitalized(T::KIND);
        let mut entries = Vec::new();

        for record in self.store.list().await {
            let meta = record.meta();
            if let Some(created) = meta.created_at {
                entries.push(ActivityEntry::new(
                    self.kind,
                    record.label(),
                    format!("{} added", noun),
                    created,
                ));
            }
            if let (Some(updated), Some(created)) = (meta.updated_at, meta.created_at) {
                if updated > created {
                    entries.push(ActivityEntry::new(
                        self.kind,
                        record.label(),
                        format!("{} updated", noun),
                        updated,
                    ));
                }
            }
        }
        Ok(entries)
    }
}

/// Category and nested skill additions
pub struct SkillActivity {
    store: Arc<CollectionStore<Category>>,
}

impl SkillActivity {
    pub fn new(store: Arc<CollectionStore<Category>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivitySource for SkillActivity {
    fn name(&self) -> &str {
        "skills"
    }

    async fn fetch(&self) -> Result<Vec<ActivityEntry>, ActivityError> {
        let mut entries = Vec::new();
        for category in self.store.list().await {
            if let Some(created) = category.meta.created_at {
                entries.push(ActivityEntry::new(
                    ActivityKind::Skill,
                    &category.name,
                    "Skill category added",
                    created,
                ));
            }
            for skill in &category.skills {
                if let Some(created) = skill.created_at {
                    entries.push(ActivityEntry::new(
                        ActivityKind::Skill,
                        &skill.name,
                        format!("Skill added to {}", category.name),
                        created,
                    ));
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Skill, PROJECTS};
    use crate::services::Portfolio;
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn updates_produce_a_second_entry() {
        let portfolio = Portfolio::new(Arc::new(MemoryDocumentStore::new()));
        let project: Project = serde_json::from_value(json!({"title": "Site"})).unwrap();
        let stored = portfolio.projects.add(project).await.unwrap();

        let source = CollectionActivity::new(ActivityKind::Project, portfolio.projects.clone());
        assert_eq!(source.fetch().await.unwrap().len(), 1);
        assert_eq!(source.name(), format!("{}.{}", PROJECTS.doc_ref(), PROJECTS.field));

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        portfolio
            .projects
            .update(&stored.meta.id, json!({"description": "new"}).as_object().cloned().unwrap())
            .await
            .unwrap();

        let entries = source.fetch().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.description == "Project updated"));
    }

    #[tokio::test]
    async fn nested_skills_each_get_an_entry() {
        let portfolio = Portfolio::new(Arc::new(MemoryDocumentStore::new()));
        portfolio.skills.add_category("Languages").await.unwrap();
        portfolio.skills.add_skill("Languages", Skill::new("Rust", 90)).await.unwrap();

        let source = SkillActivity::new(portfolio.skills.categories_store().clone());
        let entries = source.fetch().await.unwrap();
        // category creation plus the skill; category updates are not reported
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == ActivityKind::Skill));
    }
}
