//! Informational pages for backends.
//!
//! Info pages are served for read-only requests and never sit on the
//! verification path. Rendering degrades in three steps:
//!
//! ```text
//! RenderCapability::Templating(engine)
//!        │ render InfoNode.html with the backend description
//!        ▼
//!   ok? ── yes ──► InfoResponse::Fragment
//!        │ no
//!        ▼
//! template file readable?
//!        │ yes ──► InfoResponse::Body (raw file contents)
//!        │ no
//!        ▼
//! InfoResponse::Generic (host builds its own page)
//! ```
//!
//! None of the steps report an error to the caller.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// File name of the info template inside the template directory.
pub const INFO_TEMPLATE_NAME: &str = "InfoNode.html";

/// HTML that is safe to embed as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Wrap HTML the caller vouches for.
    pub fn from_trusted(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Borrow the HTML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the HTML.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Default backend description markup.
///
/// A fixed `html_description` wins unchanged. Otherwise the backend type is
/// named and the plain-text description, if any, is escaped into a `<pre>`.
#[must_use]
pub fn default_description(
    name: &str,
    html_description: Option<&str>,
    description: Option<&str>,
) -> String {
    if let Some(html) = html_description.filter(|h| !h.is_empty()) {
        return html.to_string();
    }
    let mut out = format!("<p>Notary Type: {}</p>", escape_html(name));
    if let Some(text) = description.filter(|d| !d.is_empty()) {
        out.push_str("<pre>");
        out.push_str(&escape_html(text));
        out.push_str("</pre>");
    }
    out
}

/// Per-request context for info rendering, handed through to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub params: BTreeMap<String, String>,
}

impl RequestContext {
    /// Context for a request to `path` with no parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }
}

/// A structured templating capability.
pub trait TemplateEngine: Send + Sync {
    /// Render `template`, filling its description region with `description`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be rendered.
    fn render(&self, template: &str, description: &Markup, ctx: &RequestContext)
        -> Result<Markup>;
}

/// Engine that fills a single `{{description}}` slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotTemplateEngine;

impl SlotTemplateEngine {
    const SLOT: &'static str = "description";
}

impl TemplateEngine for SlotTemplateEngine {
    fn render(
        &self,
        template: &str,
        description: &Markup,
        _ctx: &RequestContext,
    ) -> Result<Markup> {
        let mut rest = template;
        let mut out = String::with_capacity(template.len() + description.as_str().len());
        let mut filled = false;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let name = rest[start + 2..start + 2 + len].trim();
            out.push_str(&rest[..start]);
            if name == Self::SLOT {
                out.push_str(description.as_str());
                filled = true;
            } else {
                out.push_str(&rest[start..start + 4 + len]);
            }
            rest = &rest[start + 4 + len..];
        }
        out.push_str(rest);

        if filled {
            Ok(Markup(out))
        } else {
            Err(Error::Template(format!(
                "template has no {{{{{}}}}} slot",
                Self::SLOT
            )))
        }
    }
}

/// Rendering capability available to the host.
#[derive(Clone, Default)]
pub enum RenderCapability {
    /// A templating engine is available.
    Templating(Arc<dyn TemplateEngine>),
    /// Only the raw template file can be served.
    #[default]
    StaticOnly,
}

impl RenderCapability {
    /// Capability backed by [`SlotTemplateEngine`].
    #[must_use]
    pub fn slot_templates() -> Self {
        Self::Templating(Arc::new(SlotTemplateEngine))
    }
}

impl fmt::Debug for RenderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templating(_) => f.write_str("Templating"),
            Self::StaticOnly => f.write_str("StaticOnly"),
        }
    }
}

/// Outcome of info rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoResponse {
    /// Raw HTML body.
    Body(String),
    /// Rendered template fragment.
    Fragment(Markup),
    /// No custom page; the host should serve its generic description.
    Generic,
}

impl InfoResponse {
    /// Turn the response into an HTML body, using `generic` for [`Self::Generic`].
    pub fn into_html(self, generic: impl FnOnce() -> String) -> String {
        match self {
            Self::Body(body) => body,
            Self::Fragment(markup) => markup.into_string(),
            Self::Generic => generic(),
        }
    }
}

/// Renders info pages from a template file and an optional engine.
#[derive(Debug, Clone)]
pub struct InfoRenderer {
    template_path: PathBuf,
    capability: RenderCapability,
}

impl InfoRenderer {
    /// Renderer for the template at `template_path`.
    pub fn new(template_path: impl Into<PathBuf>, capability: RenderCapability) -> Self {
        Self {
            template_path: template_path.into(),
            capability,
        }
    }

    /// Renderer for [`INFO_TEMPLATE_NAME`] inside `template_dir`.
    pub fn in_dir(template_dir: impl AsRef<Path>, capability: RenderCapability) -> Self {
        Self::new(template_dir.as_ref().join(INFO_TEMPLATE_NAME), capability)
    }

    /// Path of the template file.
    #[must_use]
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Render the info page. `describe` is only called when a template is rendered.
    pub fn render(&self, describe: impl FnOnce() -> String, ctx: &RequestContext) -> InfoResponse {
        match self.try_render(describe, ctx) {
            Ok(response) => response,
            Err(e) => {
                debug!(path = %self.template_path.display(), "serving generic info: {e}");
                InfoResponse::Generic
            }
        }
    }

    fn try_render(
        &self,
        describe: impl FnOnce() -> String,
        ctx: &RequestContext,
    ) -> Result<InfoResponse> {
        if let RenderCapability::Templating(engine) = &self.capability {
            match self.render_template(engine.as_ref(), describe, ctx) {
                Ok(markup) => return Ok(InfoResponse::Fragment(markup)),
                Err(e) => warn!(
                    path = %self.template_path.display(),
                    "template rendering failed, falling back to raw template: {e}"
                ),
            }
        }

        std::fs::read_to_string(&self.template_path)
            .map(InfoResponse::Body)
            .map_err(|e| {
                debug!(path = %self.template_path.display(), "template unreadable: {e}");
                Error::InfoRenderingUnavailable
            })
    }

    fn render_template(
        &self,
        engine: &dyn TemplateEngine,
        describe: impl FnOnce() -> String,
        ctx: &RequestContext,
    ) -> Result<Markup> {
        let template = std::fs::read_to_string(&self.template_path)?;
        let description = Markup::from_trusted(describe());
        engine.render(&template, &description, ctx)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn template_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write template");
        file
    }

    struct FailingEngine;

    impl TemplateEngine for FailingEngine {
        fn render(&self, _: &str, _: &Markup, _: &RequestContext) -> Result<Markup> {
            Err(Error::Template("engine broken".to_string()))
        }
    }

    #[test]
    fn html_description_returned_unmodified() {
        let html = "<b>custom</b> & <i>raw</i>";
        assert_eq!(default_description("Pinned", Some(html), Some("ignored")), html);
    }

    #[test]
    fn plain_description_is_escaped() {
        let out = default_description("Pinned", None, Some("<script>alert(1)</script>"));
        assert!(out.contains("Notary Type: Pinned"));
        assert!(out.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn description_without_text_names_type_only() {
        assert_eq!(
            default_description("Verifier", None, None),
            "<p>Notary Type: Verifier</p>"
        );
    }

    #[test]
    fn slot_engine_fills_description() {
        let engine = SlotTemplateEngine;
        let out = engine
            .render(
                "<div>{{ description }}</div>{{other}}",
                &Markup::from_trusted("<p>x</p>"),
                &RequestContext::default(),
            )
            .expect("render");
        assert_eq!(out.as_str(), "<div><p>x</p></div>{{other}}");
    }

    #[test]
    fn slot_engine_requires_slot() {
        let engine = SlotTemplateEngine;
        let result = engine.render(
            "<div>static</div>",
            &Markup::from_trusted(""),
            &RequestContext::default(),
        );
        assert!(matches!(result, Err(Error::Template(ref reason)) if reason.contains("description")));
    }

    #[test]
    fn templating_renders_fragment() {
        let file = template_file("<html>{{description}}</html>");
        let renderer = InfoRenderer::new(file.path(), RenderCapability::slot_templates());
        let response = renderer.render(|| "<p>hi</p>".to_string(), &RequestContext::new("/"));
        assert_eq!(
            response,
            InfoResponse::Fragment(Markup::from_trusted("<html><p>hi</p></html>"))
        );
    }

    #[test]
    fn static_only_serves_raw_template() {
        let contents = "<html>{{description}} verbatim</html>";
        let file = template_file(contents);
        let renderer = InfoRenderer::new(file.path(), RenderCapability::StaticOnly);
        let response = renderer.render(|| unreachable!(), &RequestContext::new("/"));
        assert_eq!(response, InfoResponse::Body(contents.to_string()));
    }

    #[test]
    fn failing_engine_falls_back_to_raw_template() {
        let file = template_file("raw");
        let renderer =
            InfoRenderer::new(file.path(), RenderCapability::Templating(Arc::new(FailingEngine)));
        let response = renderer.render(String::new, &RequestContext::new("/"));
        assert_eq!(response, InfoResponse::Body("raw".to_string()));
    }

    #[test]
    fn missing_template_is_generic() {
        let dir = tempfile::tempdir().expect("temp dir");
        for capability in [RenderCapability::StaticOnly, RenderCapability::slot_templates()] {
            let renderer = InfoRenderer::in_dir(dir.path(), capability);
            let response = renderer.render(String::new, &RequestContext::new("/"));
            assert_eq!(response, InfoResponse::Generic);
        }
    }

    #[test]
    fn generic_uses_host_fallback() {
        assert_eq!(InfoResponse::Generic.into_html(|| "host".to_string()), "host");
        assert_eq!(InfoResponse::Body("b".into()).into_html(String::new), "b");
    }

    proptest! {
        #[test]
        fn escaped_text_contains_no_markup(text in ".*") {
            let escaped = escape_html(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }

        #[test]
        fn plain_text_round_trips_unchanged(text in "[a-zA-Z0-9 .:/_-]*") {
            prop_assert_eq!(escape_html(&text), text);
        }
    }
}
