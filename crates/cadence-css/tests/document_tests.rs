//! Integration tests for resolving keyframes against a JSON document model.

use std::collections::{BTreeMap, HashMap};

use cadence_css::{CssError, DocumentModel, ScopedContext};

const DOCUMENT: &str = r##"{
    "config": {
        "viewport": { "width": 800, "height": 600 },
        "root_font_size": 20,
        "base_url": "https://acme.org/anim/"
    },
    "elements": {
        "#stage": { "width": 400, "height": 300 }
    },
    "targets": [
        {
            "rect": { "x": 10, "y": 20, "width": 100, "height": 50 },
            "font_size": 12,
            "properties": { "--distance": "50%", "--delay": "calc(index() * 100ms)" }
        },
        {
            "rect": { "width": 200, "height": 80 },
            "properties": { "--distance": "1rem", "--delay": "calc(index() * 100ms)" }
        }
    ]
}"##;

fn context() -> ScopedContext {
    let document: DocumentModel = serde_json::from_str(DOCUMENT).unwrap();
    ScopedContext::new(document)
}

#[test]
fn test_document_defaults() {
    let document: DocumentModel = serde_json::from_str("{}").unwrap();
    assert_eq!(document, DocumentModel::default());
    assert!(document.targets.is_empty());
    assert_eq!(document.config.root_font_size, 16.0);
}

#[test]
fn test_keyframe_per_target() {
    let context = context();
    let keyframe: BTreeMap<String, String> = [
        ("offset", "0.5"),
        ("transform", "translateX(var(--distance))"),
        ("width", "calc(width('#stage') / 2)"),
        ("opacity", "0.3"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    let first = context.with_target(Some(0), || context.resolve_css_map(&keyframe)).unwrap();
    assert_eq!(first["offset"], "0.5");
    assert_eq!(first["transform"], "translatex(50px)");
    assert_eq!(first["width"], "200px");
    assert_eq!(first["opacity"], "0.3");

    let second = context.with_target(Some(1), || context.resolve_css_map(&keyframe)).unwrap();
    assert_eq!(second["transform"], "translatex(20px)");
}

#[test]
fn test_timing_per_target() {
    let context = context();
    let delays: Vec<_> = (0..2)
        .map(|index| {
            context.with_target(Some(index), || context.resolve_millis("var(--delay)", Some(0.0)))
        })
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(delays, vec![Some(0.0), Some(100.0)]);

    context.with_target(Some(0), || {
        assert_eq!(context.resolve_millis("2s", None), Ok(Some(2000.0)));
        assert_eq!(context.resolve_millis("var(--nope)", Some(5.0)), Ok(Some(5.0)));
        assert_eq!(context.resolve_number("infinite", None), Ok(Some(f64::INFINITY)));
        assert_eq!(context.resolve_number("calc(2 * 3)", None), Ok(Some(6.0)));
        assert_eq!(
            context.resolve_ident("var(--easing)", Some("ease")),
            Ok(Some("ease".to_string()))
        );
    });
}

#[test]
fn test_scoped_vars_shadow_properties() {
    let context = context();
    let vars = HashMap::from([("--distance".to_string(), "7px".to_string())]);
    let css = context.with_target(Some(0), || {
        context.with_vars(vars, || context.resolve_css("translateX(var(--distance))"))
    });
    assert_eq!(css, Ok("translatex(7px)".to_string()));
}

#[test]
fn test_urls() {
    let context = context();
    assert_eq!(
        context.resolve_css("url(img/a.png)"),
        Ok("url(\"https://acme.org/anim/img/a.png\")".to_string())
    );
    assert!(matches!(
        context.resolve_css("url(http://acme.org/a.png)"),
        Err(CssError::Url(_))
    ));
}

#[test]
fn test_target_functions_require_target() {
    let context = context();
    assert_eq!(context.resolve_css("calc(index() * 1px)"), Err(CssError::NoTarget));
    assert_eq!(context.resolve_css("10vw"), Ok("80px".to_string()));
}
