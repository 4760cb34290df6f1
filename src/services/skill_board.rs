use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::collection::{entity::require_non_empty, generate_key, CollectionError, CollectionStore, Entity};
use crate::models::skill::check_level;
use crate::models::{Category, KeySkill, Skill};

/// Skills page operations layered over the category and key-skill stores.
///
/// Nested skills live inside their category record, so every skill change is
/// a keyed replace of the whole category.
pub struct SkillBoard {
    categories: Arc<CollectionStore<Category>>,
    key_skills: Arc<CollectionStore<KeySkill>>,
}

impl SkillBoard {
    pub fn new(categories: Arc<CollectionStore<Category>>, key_skills: Arc<CollectionStore<KeySkill>>) -> Self {
        Self {
            categories,
            key_skills,
        }
    }

    pub fn categories_store(&self) -> &Arc<CollectionStore<Category>> {
        &self.categories
    }

    pub fn key_skills_store(&self) -> &Arc<CollectionStore<KeySkill>> {
        &self.key_skills
    }

    pub async fn load(&self) -> Result<(), CollectionError> {
        self.categories.load().await?;
        self.key_skills.load().await?;
        Ok(())
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.categories.list().await
    }

    pub async fn key_skills(&self) -> Vec<KeySkill> {
        self.key_skills.list().await
    }

    /// Number of skills across every category
    pub async fn total_skills(&self) -> usize {
        self.categories
            .list()
            .await
            .iter()
            .map(|category| category.skills.len())
            .sum()
    }

    /// Look a category up by id, falling back to its (case-insensitive) name
    pub async fn resolve_category(&self, id_or_name: &str) -> Result<Option<Category>, CollectionError> {
        self.categories.ensure_loaded().await?;
        if let Some(category) = self.categories.get(id_or_name).await {
            return Ok(Some(category));
        }
        let wanted = id_or_name.trim().to_string();
        Ok(self.categories.find(move |category| category.same_name(&wanted)).await)
    }

    pub async fn add_category(&self, name: &str) -> Result<Category, CollectionError> {
        self.categories.add(Category::new(name)).await
    }

    /// Remove a category and, with it, every nested skill. Returns the removed
    /// category, or `None` when nothing matched.
    pub async fn remove_category(&self, id_or_name: &str) -> Result<Option<Category>, CollectionError> {
        let Some(category) = self.resolve_category(id_or_name).await? else {
            return Ok(None);
        };
        if !self.categories.remove(category.key()).await? {
            return Ok(None);
        }
        info!(
            "Removed category '{}' with {} skill(s)",
            category.name,
            category.skills.len()
        );
        Ok(Some(category))
    }

    pub async fn add_skill(&self, category: &str, mut skill: Skill) -> Result<Skill, CollectionError> {
        skill.name = skill.name.trim().to_string();
        skill.validate()?;

        let target = self
            .resolve_category(category)
            .await?
            .ok_or_else(|| CollectionError::not_found(Category::KIND, category))?;

        let now = Utc::now();
        skill.id = generate_key(now);
        skill.created_at = Some(now);

        let added = skill.clone();
        self.categories
            .modify(target.key(), move |existing| {
                if existing.skills.iter().any(|s| s.same_name(&skill.name)) {
                    return Err(CollectionError::validation("name", "Skill already exists"));
                }
                let mut next = existing.clone();
                next.skills.push(skill);
                Ok(next)
            })
            .await?;
        Ok(added)
    }

    pub async fn update_skill(
        &self,
        category: &str,
        skill_id: &str,
        name: Option<String>,
        level: Option<i64>,
    ) -> Result<Skill, CollectionError> {
        let name = name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            require_non_empty("name", name, "Please enter a skill name")?;
        }
        if let Some(level) = level {
            check_level(level)?;
        }

        let target = self
            .resolve_category(category)
            .await?
            .ok_or_else(|| CollectionError::not_found(Category::KIND, category))?;

        let updated = self
            .categories
            .modify(target.key(), |existing| {
                let mut next = existing.clone();
                if let Some(name) = &name {
                    if next
                        .skills
                        .iter()
                        .any(|s| s.id != skill_id && s.same_name(name))
                    {
                        return Err(CollectionError::validation("name", "Skill already exists"));
                    }
                }
                let skill = next
                    .skills
                    .iter_mut()
                    .find(|s| s.id == skill_id)
                    .ok_or_else(|| CollectionError::not_found("skill", skill_id))?;
                if let Some(name) = name {
                    skill.name = name;
                }
                if let Some(level) = level {
                    skill.level = level;
                }
                Ok(next)
            })
            .await?;

        updated
            .skills
            .into_iter()
            .find(|s| s.id == skill_id)
            .ok_or_else(|| CollectionError::not_found("skill", skill_id))
    }

    /// Returns `false` when the category or skill does not exist
    pub async fn remove_skill(&self, category: &str, skill_id: &str) -> Result<bool, CollectionError> {
        let Some(target) = self.resolve_category(category).await? else {
            return Ok(false);
        };
        if !target.skills.iter().any(|s| s.id == skill_id) {
            return Ok(false);
        }

        self.categories
            .modify(target.key(), |existing| {
                let mut next = existing.clone();
                next.skills.retain(|s| s.id != skill_id);
                Ok(next)
            })
            .await?;
        Ok(true)
    }

    pub async fn add_key_skill(&self, name: &str) -> Result<KeySkill, CollectionError> {
        self.key_skills.add(KeySkill::new(name)).await
    }

    pub async fn remove_key_skill(&self, id: &str) -> Result<bool, CollectionError> {
        self.key_skills.remove(id).await
    }
}
