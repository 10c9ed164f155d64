use crate::config::RenderConfig;
use crate::error::{Result, WatchError};
use crate::feed::types::Item;
use minijinja::{context, Environment};

/// Built-in digest layout; `posts` is the repeated list.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/digest.html");

/// The `.html` suffix turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "digest.html";

pub struct DigestRenderer {
    source: String,
}

impl DigestRenderer {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        // Compile once up front so a broken template fails before any network I/O.
        {
            let mut env = Environment::new();
            env.add_template(TEMPLATE_NAME, &source)
                .map_err(|e| WatchError::Render(format!("template parse error: {}", e)))?;
        }
        Ok(Self { source })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        match &config.template_path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| {
                    WatchError::Config(format!("cannot read template {}: {}", path.display(), e))
                })?;
                Self::new(source)
            }
            None => Self::new(DEFAULT_TEMPLATE),
        }
    }

    pub fn render(&self, items: &[Item]) -> Result<String> {
        render(&self.source, items)
    }
}

/// Substitute `items`, in order, into the template's `posts` block.
pub fn render(template: &str, items: &[Item]) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, template)
        .map_err(|e| WatchError::Render(format!("template parse error: {}", e)))?;
    let tmpl = env
        .get_template(TEMPLATE_NAME)
        .map_err(|e| WatchError::Render(format!("template not found: {}", e)))?;
    tmpl.render(context! { posts => items })
        .map_err(|e| WatchError::Render(format!("template render error: {}", e)))
}
