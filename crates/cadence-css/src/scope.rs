//! A [`CssContext`] over a static document model.
//!
//! [`ScopedContext`] carries the ambient resolution state: the current
//! target, the current variable scope, the current dimension and the chain
//! of variables being resolved. Each is set for the extent of a callback
//! and restored by a drop guard, so early returns and `?` leave the context
//! exactly as they found it.
//!
//! The document itself is plain data: a viewport, a root font size, a base
//! URL, elements addressable by selector, and the animation targets with
//! their geometry and custom properties.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use cadence_common::url::{assert_https_url, resolve_url};
use cadence_common::warning::warn_once;
use serde::{Deserialize, Serialize};

use crate::context::{CssContext, Dimension, ElementRect, SelectionMethod, Size};
use crate::error::CssError;
use crate::node::{Node, is_var_css};
use crate::parser::parse;
use crate::units::DEFAULT_FONT_SIZE_PX;

/// Component name used in warnings.
const COMPONENT: &str = "Animation";

/// Keyframe keys copied through [`ScopedContext::resolve_css_map`] as-is.
const VERBATIM_KEYS: [&str; 1] = ["offset"];

/// Document-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Viewport size for `vw`, `vh`, `vmin` and `vmax`.
    pub viewport: Size,
    /// Root element font size for `rem`, in px.
    pub root_font_size: f64,
    /// Base for relative `url()` values.
    pub base_url: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 720.0),
            root_font_size: DEFAULT_FONT_SIZE_PX,
            base_url: None,
        }
    }
}

/// One animation target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetModel {
    /// Border box.
    pub rect: ElementRect,
    /// Computed font size in px. Falls back to the root font size.
    pub font_size: Option<f64>,
    /// Custom properties, keyed by name including the leading `--`.
    pub properties: HashMap<String, String>,
    /// Ancestors addressable by `closest()` selectors.
    pub ancestors: HashMap<String, ElementRect>,
}

/// The document an animation runs in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentModel {
    /// Document-wide settings.
    pub config: ContextConfig,
    /// Elements addressable by selector.
    pub elements: HashMap<String, ElementRect>,
    /// The selected targets, in order.
    pub targets: Vec<TargetModel>,
}

/// The reference [`CssContext`].
///
/// Parsed expressions are cached per source text for the lifetime of the
/// context.
#[derive(Debug, Default)]
pub struct ScopedContext {
    document: DocumentModel,
    current_target: Cell<Option<usize>>,
    vars: RefCell<Option<HashMap<String, String>>>,
    var_path: RefCell<Vec<String>>,
    dimension: Cell<Option<Dimension>>,
    parsed: RefCell<HashMap<String, Option<Node>>>,
}

impl ScopedContext {
    /// Create a context over `document` with no target selected.
    #[must_use]
    pub fn new(document: DocumentModel) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// The document this context reads from.
    #[must_use]
    pub const fn document(&self) -> &DocumentModel {
        &self.document
    }

    /// Run `callback` with the target at `index` as the current target, or
    /// with no current target for `None`.
    pub fn with_target<T>(&self, index: Option<usize>, callback: impl FnOnce() -> T) -> T {
        let _scope = TargetScope {
            context: self,
            saved: self.current_target.replace(index),
        };
        callback()
    }

    /// Run `callback` with `vars` as the variable scope. Scoped variables
    /// shadow the current target's custom properties.
    pub fn with_vars<T>(
        &self,
        vars: HashMap<String, String>,
        callback: impl FnOnce() -> T,
    ) -> T {
        let _scope = VarsScope {
            context: self,
            saved: self.vars.replace(Some(vars)),
        };
        callback()
    }

    /// Resolve a CSS value to text, normalizing units.
    ///
    /// Values without context-dependent parts are returned unchanged, and
    /// unavailable values resolve to the empty string.
    ///
    /// # Errors
    ///
    /// Fails when the value is malformed or resolution hits a hard error.
    pub fn resolve_css(&self, input: &str) -> Result<String, CssError> {
        Ok(self.resolve_css_text(input, Some(""), true)?.unwrap_or_default())
    }

    /// Resolve every value of a keyframe, except `offset` which is copied.
    ///
    /// # Errors
    ///
    /// Fails on the first value that fails [`resolve_css`](Self::resolve_css).
    pub fn resolve_css_map(
        &self,
        input: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, CssError> {
        input
            .iter()
            .map(|(key, value)| {
                let resolved = if VERBATIM_KEYS.contains(&key.as_str()) {
                    value.clone()
                } else {
                    self.resolve_css(value)?
                };
                Ok((key.clone(), resolved))
            })
            .collect()
    }

    /// Resolve an identifier-like value, such as an easing or a fill mode,
    /// without normalizing. Empty and unavailable values yield `default`.
    ///
    /// # Errors
    ///
    /// Fails when the value is malformed or resolution hits a hard error.
    pub fn resolve_ident(
        &self,
        input: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, CssError> {
        self.resolve_css_text(input, default, false)
    }

    /// Resolve a duration or delay to milliseconds. Empty and unavailable
    /// values yield `default`; values that resolve to something other than a
    /// time or a number yield `None`.
    ///
    /// # Errors
    ///
    /// Fails when the value is malformed or resolution hits a hard error.
    pub fn resolve_millis(&self, input: &str, default: Option<f64>) -> Result<Option<f64>, CssError> {
        match self.resolve_as_node(input, false)? {
            Some(node) => node.as_millis(),
            None => Ok(default),
        }
    }

    /// Resolve an iteration count or similar to a number. `infinite` is
    /// infinity. Empty and unavailable values yield `default`.
    ///
    /// # Errors
    ///
    /// Fails when the value is malformed or resolution hits a hard error.
    pub fn resolve_number(&self, input: &str, default: Option<f64>) -> Result<Option<f64>, CssError> {
        match self.resolve_as_node(input, false)? {
            Some(node) => Ok(node.as_number()),
            None => Ok(default),
        }
    }

    fn resolve_css_text(
        &self,
        input: &str,
        default: Option<&str>,
        normalize: bool,
    ) -> Result<Option<String>, CssError> {
        if input.is_empty() {
            return Ok(default.map(str::to_string));
        }
        if !is_var_css(input, normalize) {
            return Ok(Some(input.to_string()));
        }
        match self.resolve_as_node(input, normalize)? {
            Some(node) => Ok(Some(node.css()?)),
            None => Ok(default.map(str::to_string)),
        }
    }

    /// Parse (through the cache) and resolve a value.
    fn resolve_as_node(&self, input: &str, normalize: bool) -> Result<Option<Node>, CssError> {
        if input.is_empty() {
            return Ok(None);
        }
        let Some(node) = self.parse_cached(input)? else {
            return Ok(None);
        };
        let resolved = node.resolve(self, normalize)?.map(Cow::into_owned);
        Ok(resolved)
    }

    /// Parse failures are not cached, so they are reported on every use.
    fn parse_cached(&self, input: &str) -> Result<Option<Node>, CssError> {
        if let Some(node) = self.parsed.borrow().get(input) {
            return Ok(node.clone());
        }
        let node = parse(input)?;
        let _ = self
            .parsed
            .borrow_mut()
            .insert(input.to_string(), node.clone());
        Ok(node)
    }

    fn target(&self) -> Option<&TargetModel> {
        self.current_target
            .get()
            .and_then(|index| self.document.targets.get(index))
    }

    fn require_target(&self) -> Result<&TargetModel, CssError> {
        self.target().ok_or(CssError::NoTarget)
    }
}

impl CssContext for ScopedContext {
    fn resolve_url(&self, url: &str) -> Result<String, CssError> {
        let resolved = resolve_url(url, self.document.config.base_url.as_deref());
        Ok(assert_https_url(&resolved)?)
    }

    fn get_var(&self, name: &str) -> Result<Option<Node>, CssError> {
        if self.var_path.borrow().iter().any(|entry| entry == name) {
            return Err(CssError::RecursiveVariable(name.to_string()));
        }
        self.var_path.borrow_mut().push(name.to_string());
        let _guard = VarPathGuard { context: self };

        let scoped = self
            .vars
            .borrow()
            .as_ref()
            .and_then(|vars| vars.get(name).cloned());
        let raw = scoped.or_else(|| {
            self.target()
                .and_then(|target| target.properties.get(name).cloned())
        });
        if raw.as_deref().is_none_or(str::is_empty) {
            warn_once(COMPONENT, &format!("Variable not found: \"{name}\""));
        }
        // Units are normalized by the caller.
        match raw {
            Some(raw) => self.resolve_as_node(&raw, false),
            None => Ok(None),
        }
    }

    fn current_index(&self) -> Result<usize, CssError> {
        let _ = self.require_target()?;
        self.current_target.get().ok_or(CssError::NoTarget)
    }

    fn target_length(&self) -> Result<usize, CssError> {
        let _ = self.require_target()?;
        Ok(self.document.targets.len())
    }

    fn current_font_size(&self) -> Result<f64, CssError> {
        let target = self.require_target()?;
        Ok(target
            .font_size
            .unwrap_or(self.document.config.root_font_size))
    }

    fn root_font_size(&self) -> f64 {
        self.document.config.root_font_size
    }

    fn viewport_size(&self) -> Size {
        self.document.config.viewport
    }

    fn current_element_rect(&self) -> Result<ElementRect, CssError> {
        Ok(self.require_target()?.rect)
    }

    fn element_rect(
        &self,
        selector: &str,
        method: Option<SelectionMethod>,
    ) -> Result<ElementRect, CssError> {
        let found = match method {
            Some(SelectionMethod::Closest) => self.require_target()?.ancestors.get(selector),
            None => self.document.elements.get(selector),
        };
        found
            .copied()
            .ok_or_else(|| CssError::ElementNotFound(selector.to_string()))
    }

    fn dimension(&self) -> Option<Dimension> {
        self.dimension.get()
    }

    fn replace_dimension(&self, dim: Option<Dimension>) -> Option<Dimension> {
        self.dimension.replace(dim)
    }
}

struct TargetScope<'c> {
    context: &'c ScopedContext,
    saved: Option<usize>,
}

impl Drop for TargetScope<'_> {
    fn drop(&mut self) {
        self.context.current_target.set(self.saved);
    }
}

struct VarsScope<'c> {
    context: &'c ScopedContext,
    saved: Option<HashMap<String, String>>,
}

impl Drop for VarsScope<'_> {
    fn drop(&mut self) {
        *self.context.vars.borrow_mut() = self.saved.take();
    }
}

struct VarPathGuard<'c> {
    context: &'c ScopedContext,
}

impl Drop for VarPathGuard<'_> {
    fn drop(&mut self) {
        let _ = self.context.var_path.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> DocumentModel {
        let mut first = TargetModel {
            rect: ElementRect::sized(110.0, 220.0),
            font_size: Some(10.0),
            ..TargetModel::default()
        };
        let _ = first.properties.insert("--size".into(), "2em".into());
        let _ = first.properties.insert("--loop-a".into(), "var(--loop-b)".into());
        let _ = first.properties.insert("--loop-b".into(), "var(--loop-a)".into());
        let _ = first
            .ancestors
            .insert(".card".into(), ElementRect::sized(400.0, 300.0));
        let mut document = DocumentModel {
            targets: vec![first, TargetModel::default()],
            ..DocumentModel::default()
        };
        let _ = document
            .elements
            .insert("#hero".into(), ElementRect::sized(640.0, 480.0));
        document.config.base_url = Some("https://acme.org/anim/".into());
        document
    }

    #[test]
    fn test_with_target_restores() {
        let context = ScopedContext::new(document());
        assert_eq!(context.current_index(), Err(CssError::NoTarget));
        context.with_target(Some(1), || {
            assert_eq!(context.current_index(), Ok(1));
            context.with_target(Some(0), || assert_eq!(context.current_index(), Ok(0)));
            assert_eq!(context.current_index(), Ok(1));
            assert_eq!(context.target_length(), Ok(2));
        });
        assert_eq!(context.current_index(), Err(CssError::NoTarget));
    }

    #[test]
    fn test_vars_shadow_properties() {
        let context = ScopedContext::new(document());
        context.with_target(Some(0), || {
            assert_eq!(context.resolve_css("var(--size)").unwrap(), "20px");
            let vars = HashMap::from([("--size".to_string(), "5px".to_string())]);
            context.with_vars(vars, || {
                assert_eq!(context.resolve_css("var(--size)").unwrap(), "5px");
            });
            assert_eq!(context.resolve_css("var(--size)").unwrap(), "20px");
        });
    }

    #[test]
    fn test_get_var_does_not_normalize() {
        let context = ScopedContext::new(document());
        context.with_target(Some(0), || {
            assert_eq!(context.get_var("--size"), Ok(Some(Node::length(2.0, "em"))));
        });
    }

    #[test]
    fn test_recursive_variable_rejected() {
        let context = ScopedContext::new(document());
        context.with_target(Some(0), || {
            assert!(matches!(
                context.resolve_css("var(--loop-a)"),
                Err(CssError::RecursiveVariable(_))
            ));
            // The path is unwound after the failure.
            assert_eq!(context.resolve_css("var(--size)").unwrap(), "20px");
        });
    }

    #[test]
    fn test_missing_variable_unavailable() {
        let context = ScopedContext::new(document());
        assert_eq!(context.get_var("--nope"), Ok(None));
        assert!(cadence_common::warning::was_warned(
            COMPONENT,
            "Variable not found: \"--nope\""
        ));
        assert_eq!(context.resolve_css("var(--nope)").unwrap(), "");
        assert_eq!(context.resolve_ident("var(--nope)", Some("ease")).unwrap(), Some("ease".into()));
    }

    #[test]
    fn test_resolve_css_fast_path() {
        let context = ScopedContext::new(document());
        assert_eq!(context.resolve_css("").unwrap(), "");
        assert_eq!(context.resolve_css("rotate(45 deg").unwrap(), "rotate(45 deg");
        assert_eq!(context.resolve_css("1s").unwrap(), "1000ms");
    }

    #[test]
    fn test_resolve_css_map_keeps_offset() {
        let context = ScopedContext::new(document());
        let frame = BTreeMap::from([
            ("offset".to_string(), "0.5".to_string()),
            ("opacity".to_string(), "calc(1 / 2)".to_string()),
        ]);
        let resolved = context.resolve_css_map(&frame).unwrap();
        assert_eq!(resolved["offset"], "0.5");
        assert_eq!(resolved["opacity"], "0.5");
    }

    #[test]
    fn test_resolve_millis_and_number() {
        let context = ScopedContext::new(document());
        assert_eq!(context.resolve_millis("2s", Some(1.0)), Ok(Some(2000.0)));
        assert_eq!(context.resolve_millis("", Some(1.0)), Ok(Some(1.0)));
        assert_eq!(context.resolve_millis("var(--x)", Some(7.0)), Ok(Some(7.0)));
        assert_eq!(context.resolve_millis("10px", Some(1.0)), Ok(None));
        assert_eq!(context.resolve_number("3", None), Ok(Some(3.0)));
        assert_eq!(context.resolve_number("infinite", None), Ok(Some(f64::INFINITY)));
        assert_eq!(context.resolve_number("", Some(1.0)), Ok(Some(1.0)));
    }

    #[test]
    fn test_element_rects() {
        let context = ScopedContext::new(document());
        assert_eq!(context.resolve_css("width('#hero')").unwrap(), "640px");
        assert_eq!(
            context.resolve_css("width('#missing')"),
            Err(CssError::ElementNotFound("#missing".into()))
        );
        assert_eq!(
            context.resolve_css("height(closest('.card'))"),
            Err(CssError::NoTarget)
        );
        context.with_target(Some(0), || {
            assert_eq!(context.resolve_css("height(closest('.card'))").unwrap(), "300px");
        });
    }

    #[test]
    fn test_resolve_url() {
        let context = ScopedContext::new(document());
        assert_eq!(
            context.resolve_css("url(img/a.png)").unwrap(),
            "url(\"https://acme.org/anim/img/a.png\")"
        );
        assert!(matches!(
            context.resolve_css("url('http://acme.org/a.png')"),
            Err(CssError::Url(_))
        ));
    }

    #[test]
    fn test_index_and_font_sizes() {
        let context = ScopedContext::new(document());
        context.with_target(Some(1), || {
            assert_eq!(context.resolve_css("calc(index() * 10px)").unwrap(), "10px");
            assert_eq!(context.resolve_css("2em").unwrap(), "32px");
        });
        assert_eq!(context.resolve_css("2rem").unwrap(), "32px");
        assert_eq!(context.resolve_css("10vw").unwrap(), "128px");
    }
}
