use std::collections::BTreeMap;

use crate::error::TableError;
use crate::extract::{TableExtraction, fetch_table_data};

/// Signature shared by every table template.
pub type TemplateFn = fn(&[String], &str) -> TableExtraction;

pub const GENERIC_TABLE: &str = "generic_table";

fn generic_table(table_queries: &[String], table_html: &str) -> TableExtraction {
    fetch_table_data(table_queries, table_html)
}

/// Maps template names to extraction functions.
///
/// Built-in templates are registered on construction; hosts may add their
/// own before handing the registry out.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateFn>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self {
            templates: BTreeMap::new(),
        };
        registry.register(GENERIC_TABLE, generic_table);
        registry
    }
}

impl TemplateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub fn register(&mut self, name: impl Into<String>, template: TemplateFn) {
        self.templates.insert(name.into(), template);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn fetch_table_data(
        &self,
        template_name: &str,
        table_queries: &[String],
        table_html: &str,
    ) -> Result<TableExtraction, TableError> {
        let template = self
            .templates
            .get(template_name)
            .ok_or_else(|| TableError::UnknownTemplate(template_name.to_string()))?;
        Ok(template(table_queries, table_html))
    }
}
