//! Template registry use cases.
//!
//! Holds the built-in default template plus custom templates created from
//! outlines. Templates are shared as `Arc` and never mutated once inserted.

use std::sync::Arc;

use dashmap::DashMap;

use sessioncraft_domain::{Section, SessionTemplate, TemplateId};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(TemplateId),
    #[error("Template name is required")]
    MissingName,
    #[error("Template must contain at least one section")]
    NoSections,
}

pub struct TemplateRegistry {
    default: Arc<SessionTemplate>,
    templates: DashMap<TemplateId, Arc<SessionTemplate>>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry seeded with the built-in default.
    pub fn new() -> Self {
        let default = Arc::new(SessionTemplate::builtin_default());
        let templates = DashMap::new();
        templates.insert(default.id, default.clone());
        Self { default, templates }
    }

    pub fn default_template(&self) -> Arc<SessionTemplate> {
        self.default.clone()
    }

    /// All templates: the built-in default first, then the rest by name.
    pub fn get_templates(&self) -> Vec<Arc<SessionTemplate>> {
        let mut custom: Vec<Arc<SessionTemplate>> = self
            .templates
            .iter()
            .filter(|entry| !entry.key().is_builtin_default())
            .map(|entry| entry.value().clone())
            .collect();
        custom.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let mut all = Vec::with_capacity(custom.len() + 1);
        all.push(self.default.clone());
        all.extend(custom);
        all
    }

    pub fn get_template(&self, id: TemplateId) -> Result<Arc<SessionTemplate>, TemplateError> {
        self.templates
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(TemplateError::NotFound(id))
    }

    /// Copy `sections` into a new custom template.
    pub fn create_custom_template(
        &self,
        name: &str,
        description: &str,
        sections: &[Section],
        category: Option<String>,
    ) -> Result<Arc<SessionTemplate>, TemplateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TemplateError::MissingName);
        }
        if sections.is_empty() {
            return Err(TemplateError::NoSections);
        }

        let category = category.filter(|c| !c.trim().is_empty());
        let template = Arc::new(SessionTemplate::custom(
            name,
            description.trim(),
            sections,
            category,
        ));
        self.templates.insert(template.id, template.clone());

        tracing::info!(
            template_id = %template.id,
            name = %template.name,
            section_count = template.sections.len(),
            "Created custom template"
        );

        Ok(template)
    }

    /// Template for a generation request. Unknown ids log a warning and
    /// resolve to the default.
    pub fn resolve(&self, id: Option<TemplateId>) -> Arc<SessionTemplate> {
        match id {
            None => self.default.clone(),
            Some(id) => self.get_template(id).unwrap_or_else(|_| {
                tracing::warn!(template_id = %id, "Unknown template requested, using default");
                self.default.clone()
            }),
        }
    }
}
