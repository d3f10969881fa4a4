//! Request-time component rendering.
//!
//! The build-time transform only sees literal props. At request time the
//! real prop values are known, so the same render and split steps run per
//! call. The environment is chosen once when the renderer is created.

use std::sync::Arc;

use crate::component::{render_element, Forward};
use crate::jsx::{AttrValue, Child, Element};
use crate::props::CallProps;
use crate::render::render_component;
use crate::traits::{HydrateModule, TransformError};
use crate::transform::TransformOptions;
use crate::value::PropValue;

/// Where the renderer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Browser,
    Server,
}

/// The branch a renderer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    ClientBound,
    ServerBound,
}

/// Renders the live custom element; the browser upgrades it.
#[derive(Debug, Clone)]
pub struct ClientRenderer {
    tag_name: String,
}

/// Renders server markup through the hydrate module on every call.
pub struct ServerRenderer {
    tag_name: String,
    options: Arc<TransformOptions>,
    hydrate: Arc<dyn HydrateModule>,
}

pub enum ComponentRenderer {
    Client(ClientRenderer),
    Server(ServerRenderer),
}

impl ComponentRenderer {
    /// Bind a renderer for `tag_name` in `environment`.
    pub fn new(
        tag_name: impl Into<String>,
        environment: Environment,
        options: Arc<TransformOptions>,
        hydrate: Arc<dyn HydrateModule>,
    ) -> Self {
        let tag_name = tag_name.into();
        match environment {
            Environment::Browser => ComponentRenderer::Client(ClientRenderer {
                tag_name: options.tags.transform(&tag_name).into_owned(),
            }),
            Environment::Server => ComponentRenderer::Server(ServerRenderer {
                tag_name,
                options,
                hydrate,
            }),
        }
    }

    pub fn state(&self) -> RendererState {
        match self {
            ComponentRenderer::Client(_) => RendererState::ClientBound,
            ComponentRenderer::Server(_) => RendererState::ServerBound,
        }
    }

    /// Render one instance with live props.
    pub async fn render(
        &self,
        props: Vec<(String, PropValue)>,
        children: Option<String>,
    ) -> Result<Element, TransformError> {
        let props = CallProps::from_values(props, children);
        match self {
            ComponentRenderer::Client(client) => Ok(client.render(&props)),
            ComponentRenderer::Server(server) => server.render(&props).await,
        }
    }

    /// Render one instance to HTML.
    pub async fn render_to_html(
        &self,
        props: Vec<(String, PropValue)>,
        children: Option<String>,
    ) -> Result<String, TransformError> {
        Ok(self.render(props, children).await?.to_html())
    }
}

impl ClientRenderer {
    fn render(&self, props: &CallProps) -> Element {
        let mut element = props.values.iter().fold(
            Element::new(&self.tag_name),
            |el, (name, value)| el.attr(name.clone(), AttrValue::Value(value.clone())),
        );
        if let Some(style) = &props.style {
            element = element.attr("style", AttrValue::Style(style.clone()));
        }
        if let Some(children) = &props.children {
            element = element.child(Child::Text(children.clone()));
        }
        element
    }
}

impl ServerRenderer {
    async fn render(&self, props: &CallProps) -> Result<Element, TransformError> {
        let rendered =
            render_component(&self.tag_name, props, &self.options, self.hydrate.as_ref()).await?;
        Ok(render_element(
            &rendered,
            props.style.as_ref(),
            Forward::Static(props.children.as_deref()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow_root::{SerializeShadowRoot, ShadowRootMode};
    use crate::testing::FakeHydrate;

    fn renderer(environment: Environment, options: TransformOptions) -> (ComponentRenderer, Arc<FakeHydrate>) {
        let hydrate = Arc::new(FakeHydrate::default());
        let renderer = ComponentRenderer::new(
            "my-component",
            environment,
            Arc::new(options),
            hydrate.clone(),
        );
        (renderer, hydrate)
    }

    fn props() -> Vec<(String, PropValue)> {
        vec![
            ("first".to_string(), PropValue::from("John")),
            ("disabled".to_string(), PropValue::Bool(false)),
            ("count".to_string(), PropValue::Number(0.0)),
        ]
    }

    #[tokio::test]
    async fn browser_renders_the_custom_element_without_the_renderer() {
        let (renderer, hydrate) = renderer(Environment::Browser, TransformOptions::new("lib"));

        let html = renderer
            .render_to_html(props(), Some("Hi".to_string()))
            .await
            .unwrap();

        assert_eq!(renderer.state(), RendererState::ClientBound);
        assert_eq!(html, r#"<my-component first="John" count="0">Hi</my-component>"#);
        assert!(hydrate.calls().is_empty());
    }

    #[tokio::test]
    async fn server_renders_a_declarative_shadow_root() {
        let (renderer, hydrate) = renderer(Environment::Server, TransformOptions::new("lib"));

        let html = renderer
            .render_to_html(props(), Some("Light".to_string()))
            .await
            .unwrap();

        assert_eq!(renderer.state(), RendererState::ServerBound);
        assert!(html.starts_with("<my-component first=\"John\" count=\"0\" class=\"hydrated\""));
        assert!(html.contains("<template shadowrootmode=\"open\">"));
        assert!(html.contains("Hello, World! I'm John"));
        assert!(html.ends_with("</template>Light</my-component>"));
        assert_eq!(hydrate.calls().len(), 1);
    }

    #[tokio::test]
    async fn server_renders_scoped_markup_on_every_call() {
        let options = TransformOptions::new("lib")
            .with_serialize_shadow_root(SerializeShadowRoot::Mode(ShadowRootMode::Scoped));
        let (renderer, hydrate) = renderer(Environment::Server, options);

        for _ in 0..2 {
            let html = renderer.render_to_html(props(), None).await.unwrap();
            assert!(html.starts_with("<div style=\"display: contents;\"><style id=\"sc-my-component\">"));
        }
        assert_eq!(hydrate.calls().len(), 2);
    }
}
