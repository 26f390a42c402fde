use crate::traits::template_store::TemplateStore;
use crate::Error;
use async_trait::async_trait;
use log::*;
use std::path::PathBuf;

/// Template store backed by a directory of `create_<pattern>.md` files.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    root: PathBuf,
}

impl FileTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the template for `pattern`, or `None` when the identifier could
    /// name a file outside of the template root.
    pub fn template_path(&self, pattern: &str) -> Option<PathBuf> {
        if pattern.is_empty() || pattern.contains(['/', '\\', '\0']) {
            return None;
        }
        Some(self.root.join(format!("create_{pattern}.md")))
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn lookup(&self, pattern: &str) -> Result<String, Error> {
        let path = self.template_path(pattern).ok_or_else(|| {
            warn!("Rejected pattern identifier: {pattern:?}");
            Error::NotFound(format!("pattern '{pattern}'"))
        })?;

        debug!("Loading template for pattern '{pattern}' from {}", path.display());

        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!(
                    "no template for pattern '{pattern}' at {}",
                    path.display()
                ))
            } else {
                Error::from(e)
            }
        })
    }
}
