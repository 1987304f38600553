use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use handlebars::{DirectorySourceOptions, Handlebars, JsonValue, handlebars_helper};

use crate::context::RenderContext;

/// File extension of template sources under the theme root.
pub const TEMPLATE_EXTENSION: &str = ".hbs";

/// Renderer Contract
///
/// The boundary to the template engine. The router hands over a template id
/// and a fully built context and gets bytes back; it never looks inside the
/// engine. Swapped for stubs in tests.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Whether a template with this id was loaded.
    fn has_template(&self, name: &str) -> bool;

    /// Renders `name` against `context`.
    async fn render(&self, name: &str, context: &RenderContext) -> Result<String, RenderError>;
}

/// RendererState
///
/// Shared handle to the renderer held by the application state.
pub type RendererState = Arc<dyn Renderer>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template `{0}` does not exist")]
    Missing(String),
    #[error("template engine error: {0}")]
    Engine(String),
}

/// HandlebarsRenderer
///
/// Every `*.hbs` file under the theme root is registered once at startup, named
/// by its relative path without the extension (`css/theme.css.hbs` becomes
/// `css/theme.css`). Any registered template can also be used as a partial.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

handlebars_helper!(eq: |a: JsonValue, b: JsonValue| a == b);
handlebars_helper!(take: |items: array, limit: u64| items
    .iter()
    .take(limit as usize)
    .cloned()
    .collect::<Vec<JsonValue>>());

impl HandlebarsRenderer {
    pub fn load(theme_root: impl AsRef<Path>) -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();

        let mut options = DirectorySourceOptions::default();
        options.tpl_extension = TEMPLATE_EXTENSION.to_string();
        registry.register_templates_directory(theme_root.as_ref(), options)?;

        registry.register_helper("eq", Box::new(eq));
        registry.register_helper("take", Box::new(take));

        tracing::debug!(
            templates = registry.get_templates().len(),
            root = %theme_root.as_ref().display(),
            "templates registered"
        );

        Ok(Self { registry })
    }
}

#[async_trait]
impl Renderer for HandlebarsRenderer {
    fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    async fn render(&self, name: &str, context: &RenderContext) -> Result<String, RenderError> {
        if !self.registry.has_template(name) {
            return Err(RenderError::Missing(name.to_string()));
        }
        self.registry
            .render(name, context)
            .map_err(|e| RenderError::Engine(e.to_string()))
    }
}
