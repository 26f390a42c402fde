use crate::traits::template_store::TemplateStore;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;

/// Template store holding its templates in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    templates: HashMap<String, String>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, pattern: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(pattern.into(), text.into());
        self
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn lookup(&self, pattern: &str) -> Result<String, Error> {
        self.templates
            .get(pattern)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("pattern '{pattern}'")))
    }
}
