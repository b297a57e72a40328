//! Info page fallback chain through the public API.

use notary_backend::info::INFO_TEMPLATE_NAME;
use notary_backend::{
    Backend, BackendRegistry, InfoRenderer, InfoResponse, RenderCapability, RequestContext,
};
use std::path::Path;

fn shipped_template_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
}

#[test]
fn shipped_template_has_description_slot() {
    let backend = BackendRegistry::builtin()
        .construct("pinned", Some("pin=a:1/AA; description=Pins <b>only</b>"))
        .expect("construct");
    let renderer = InfoRenderer::in_dir(shipped_template_dir(), RenderCapability::slot_templates());

    let InfoResponse::Fragment(markup) = backend.info_node(&renderer, &RequestContext::new("/"))
    else {
        panic!("expected rendered fragment");
    };
    assert!(markup.as_str().contains("<p>Notary Type: PinnedVerifier</p>"));
    assert!(markup.as_str().contains("<pre>Pins &lt;b&gt;only&lt;/b&gt;</pre>"));
    assert!(!markup.as_str().contains("{{"));
}

#[test]
fn static_only_serves_shipped_template_verbatim() {
    let backend = BackendRegistry::builtin().construct("base", None).expect("construct");
    let renderer = InfoRenderer::in_dir(shipped_template_dir(), RenderCapability::StaticOnly);
    let expected =
        std::fs::read_to_string(shipped_template_dir().join(INFO_TEMPLATE_NAME)).expect("read");

    assert_eq!(
        backend.info_node(&renderer, &RequestContext::new("/")),
        InfoResponse::Body(expected)
    );
}

#[test]
fn no_template_means_generic() {
    let backend = BackendRegistry::builtin().construct("base", None).expect("construct");
    let dir = tempfile::tempdir().expect("temp dir");
    for capability in [RenderCapability::StaticOnly, RenderCapability::slot_templates()] {
        let renderer = InfoRenderer::in_dir(dir.path(), capability);
        assert_eq!(
            backend.info_node(&renderer, &RequestContext::new("/")),
            InfoResponse::Generic
        );
    }
}
