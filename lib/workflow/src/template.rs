//! Template rendering for node configuration fields.
//!
//! Every user-authored text field (prompts, message bodies, URLs) is
//! rendered against the current execution context before use. Rendering is
//! non-strict: missing or undefined paths produce the empty string rather
//! than an error, and output is never HTML-escaped because it feeds chat
//! messages and API payloads, not markup.
//!
//! Beyond plain interpolation (`{{trigger.user}}`) three helpers are
//! registered:
//!
//! - `{{json value}}`: pretty-printed JSON embedding of a structured value
//! - `{{get object "key with spaces?"}}`: lookup of object keys that
//!   contain spaces or special characters
//! - `{{nested object "a.b.c"}}`: deep path lookup

use crate::context::ExecutionContext;
use crate::error::TemplateError;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde_json::Value as JsonValue;

/// Renders node configuration templates against an execution context.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer with the flowline helper set registered.
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("json", Box::new(json_helper));
        handlebars.register_helper("get", Box::new(get_helper));
        handlebars.register_helper("nested", Box::new(nested_helper));
        Self { handlebars }
    }

    /// Renders a template string against the given context.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed template syntax. Missing variables are
    /// not an error; they render as the empty string.
    pub fn render(
        &self,
        template: &str,
        context: &ExecutionContext,
    ) -> Result<String, TemplateError> {
        self.handlebars
            .render_template(template, &context.as_value())
            .map_err(TemplateError::from)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a JSON value the way it should appear inside rendered text.
fn write_value(value: &JsonValue, out: &mut dyn Output) -> HelperResult {
    match value {
        JsonValue::Null => {}
        JsonValue::String(s) => out.write(s)?,
        other => out.write(&other.to_string())?,
    }
    Ok(())
}

/// `{{json value}}` embeds a structured value as pretty-printed JSON.
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h.param(0).map_or(&JsonValue::Null, |p| p.value());
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| RenderErrorReason::Other(e.to_string()))?;
    out.write(&rendered)?;
    Ok(())
}

/// `{{get object "key"}}` looks up a single object key, including keys
/// with spaces or special characters. Missing keys render as empty.
fn get_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let object = h.param(0).map_or(&JsonValue::Null, |p| p.value());
    let Some(key) = h.param(1).and_then(|p| p.value().as_str()) else {
        return Ok(());
    };
    let value = object.get(key).unwrap_or(&JsonValue::Null);
    write_value(value, out)
}

/// `{{nested object "a.b.c"}}` walks a dot-separated path. Any missing
/// segment renders as empty.
fn nested_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let mut current = h.param(0).map_or(&JsonValue::Null, |p| p.value());
    let Some(path) = h.param(1).and_then(|p| p.value().as_str()) else {
        return Ok(());
    };
    for segment in path.split('.') {
        current = current.get(segment).unwrap_or(&JsonValue::Null);
    }
    write_value(current, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: JsonValue) -> ExecutionContext {
        ExecutionContext::seed(value)
    }

    #[test]
    fn renders_variable_interpolation() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"trigger": {"user": "Amy"}}));
        let rendered = renderer.render("hi {{trigger.user}}", &ctx).expect("render");
        assert_eq!(rendered, "hi Amy");
    }

    #[test]
    fn missing_path_renders_empty() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({}));
        let rendered = renderer
            .render("value: [{{missing.path}}]", &ctx)
            .expect("render");
        assert_eq!(rendered, "value: []");
    }

    #[test]
    fn does_not_escape_html() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"name": "Q&A <session>"}));
        let rendered = renderer.render("{{name}}", &ctx).expect("render");
        assert_eq!(rendered, "Q&A <session>");
    }

    #[test]
    fn json_helper_pretty_prints() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"stripe": {"eventType": "charge.succeeded"}}));
        let rendered = renderer.render("{{json stripe}}", &ctx).expect("render");
        assert!(rendered.contains("\"eventType\": \"charge.succeeded\""));
    }

    #[test]
    fn get_helper_reads_keys_with_spaces() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({
            "googleForm": {
                "responses": {
                    "Your Name": "Amy",
                    "What can we improve?": "Faster builds"
                }
            }
        }));

        let rendered = renderer
            .render("{{get googleForm.responses \"Your Name\"}}", &ctx)
            .expect("render");
        assert_eq!(rendered, "Amy");

        let rendered = renderer
            .render("{{get googleForm.responses \"What can we improve?\"}}", &ctx)
            .expect("render");
        assert_eq!(rendered, "Faster builds");
    }

    #[test]
    fn get_helper_missing_key_is_empty() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"googleForm": {"responses": {}}}));
        let rendered = renderer
            .render("[{{get googleForm.responses \"Absent\"}}]", &ctx)
            .expect("render");
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn nested_helper_walks_deep_paths() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({
            "customerData": {
                "httpResponse": {"data": {"data": {"name": "Acme"}}}
            }
        }));
        let rendered = renderer
            .render("{{nested customerData \"httpResponse.data.data.name\"}}", &ctx)
            .expect("render");
        assert_eq!(rendered, "Acme");
    }

    #[test]
    fn nested_helper_missing_segment_is_empty() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"a": {"b": 1}}));
        let rendered = renderer.render("[{{nested a \"b.c.d\"}}]", &ctx).expect("render");
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn malformed_template_is_an_error() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({}));
        assert!(renderer.render("{{#if}}", &ctx).is_err());
    }

    #[test]
    fn non_string_values_render_as_json() {
        let renderer = TemplateRenderer::new();
        let ctx = context(json!({"count": 3, "flag": true}));
        let rendered = renderer.render("{{count}}-{{flag}}", &ctx).expect("render");
        assert_eq!(rendered, "3-true");
    }
}
