//! A configurable [`CssContext`] for resolution tests.

use std::cell::Cell;
use std::collections::HashMap;

use cadence_css::{CssContext, CssError, Dimension, ElementRect, Node, SelectionMethod, Size};

/// Context with fixed answers and a deterministic random source.
pub struct MockContext {
    pub font_size: f64,
    pub root_font_size: f64,
    pub viewport: Size,
    pub rect: Option<ElementRect>,
    pub elements: HashMap<String, ElementRect>,
    pub vars: HashMap<String, Node>,
    pub index: usize,
    pub length: usize,
    pub random: f64,
    pub dimension: Cell<Option<Dimension>>,
}

impl Default for MockContext {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            root_font_size: 16.0,
            viewport: Size::new(1000.0, 500.0),
            rect: Some(ElementRect::sized(110.0, 220.0)),
            elements: HashMap::new(),
            vars: HashMap::new(),
            index: 0,
            length: 1,
            random: 0.25,
            dimension: Cell::new(None),
        }
    }
}

#[allow(dead_code)]
impl MockContext {
    /// A context whose current target has no geometry.
    pub fn without_target() -> Self {
        Self {
            rect: None,
            ..Self::default()
        }
    }

    pub fn with_var(mut self, name: &str, value: Node) -> Self {
        let _ = self.vars.insert(name.to_string(), value);
        self
    }

    fn target(&self) -> Result<ElementRect, CssError> {
        self.rect.ok_or(CssError::NoTarget)
    }
}

impl CssContext for MockContext {
    fn resolve_url(&self, url: &str) -> Result<String, CssError> {
        if url.starts_with("http:") {
            return Err(cadence_common::url::UrlError::Insecure(url.to_string()).into());
        }
        Ok(format!("https://acme.org/{}", url.trim_start_matches('/')))
    }

    fn get_var(&self, name: &str) -> Result<Option<Node>, CssError> {
        Ok(self.vars.get(name).cloned())
    }

    fn current_index(&self) -> Result<usize, CssError> {
        self.target().map(|_| self.index)
    }

    fn target_length(&self) -> Result<usize, CssError> {
        self.target().map(|_| self.length)
    }

    fn current_font_size(&self) -> Result<f64, CssError> {
        self.target().map(|_| self.font_size)
    }

    fn root_font_size(&self) -> f64 {
        self.root_font_size
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn current_element_rect(&self) -> Result<ElementRect, CssError> {
        self.target()
    }

    fn element_rect(
        &self,
        selector: &str,
        _method: Option<SelectionMethod>,
    ) -> Result<ElementRect, CssError> {
        self.elements
            .get(selector)
            .copied()
            .ok_or_else(|| CssError::ElementNotFound(selector.to_string()))
    }

    fn dimension(&self) -> Option<Dimension> {
        self.dimension.get()
    }

    fn replace_dimension(&self, dim: Option<Dimension>) -> Option<Dimension> {
        self.dimension.replace(dim)
    }

    fn random(&self) -> f64 {
        self.random
    }
}
