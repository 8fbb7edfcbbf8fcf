//! Error and rejection types for the middleware.

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Errors raised while setting up a [`Templater`](crate::Templater).
///
/// These are fatal: an application cannot serve templates without them.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The initial compilation failed.
    #[error("template: compile {origin}: {source}")]
    Compile {
        /// Where the templates came from, e.g. `directory "templates"`.
        origin: String,
        #[source]
        source: stencil_render::Error,
    },

    /// The renderer could not be configured.
    #[error("template: configure renderer: {0}")]
    Renderer(#[source] stencil_render::Error),
}

impl SetupError {
    /// Returns the underlying render error.
    pub fn render_error(&self) -> &stencil_render::Error {
        match self {
            SetupError::Compile { source, .. } | SetupError::Renderer(source) => source,
        }
    }
}

/// Rejection returned by the [`Template`](crate::Template) and
/// [`Data`](crate::Data) extractors when [`inject`](crate::inject) did not run
/// for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing request extension {0}: is the template middleware installed?")]
pub struct MissingMiddleware(pub(crate) &'static str);

impl MissingMiddleware {
    /// Returns the status code for this rejection.
    pub const fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for MissingMiddleware {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "template extractor used without middleware");
        (self.status(), self.to_string()).into_response()
    }
}
