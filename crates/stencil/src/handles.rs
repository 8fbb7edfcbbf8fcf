//! Per-request handles: [`Template`], [`Data`] and [`ResponseBuilder`].
//!
//! [`inject`](crate::inject) inserts one `Template` and one `Data` into every
//! request. Both are cheap clones sharing the same request-scoped map, so a
//! handler can take them as separate extractors:
//!
//! ```rust,ignore
//! async fn home(template: Template, data: Data) -> Response {
//!     data.insert("Name", "Flamego");
//!     template.html(StatusCode::OK, "home")
//! }
//! ```

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use stencil_render::{BufferedResponse, DataMap, Renderer, ResponseSink, Value};

use crate::error::MissingMiddleware;

/// The request-scoped template data.
#[derive(Debug, Clone, Default)]
pub struct Data {
    map: Arc<Mutex<DataMap>>,
}

impl Data {
    /// Creates an empty data handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key, value)
    }

    /// Inserts any serializable value.
    pub fn insert_serialize<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Option<Value> {
        self.lock().insert_serialize(key, value)
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    /// Returns a copy of the current map.
    pub fn snapshot(&self) -> DataMap {
        self.lock().clone()
    }

    /// Locks the map for direct access.
    pub fn lock(&self) -> MutexGuard<'_, DataMap> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders templates for one request.
#[derive(Debug, Clone)]
pub struct Template {
    renderer: Renderer,
    data: Data,
}

impl Template {
    pub(crate) fn new(renderer: Renderer, data: Data) -> Self {
        Self { renderer, data }
    }

    /// Renders `name` with the request data into a response with `status`.
    ///
    /// Render failures produce a `500` response; see
    /// [`Renderer::render`](stencil_render::Renderer::render).
    pub fn html(&self, status: StatusCode, name: &str) -> Response {
        let mut builder = ResponseBuilder::new();
        let data = self.data.lock();
        self.renderer.render(status, name, &data, &mut builder);
        builder.into_response()
    }

    /// Renders `name` with the request data and returns the text.
    pub fn render_to_string(&self, name: &str) -> stencil_render::Result<String> {
        let data = self.data.lock();
        self.renderer.render_to_string(name, &data)
    }

    /// Returns the request data shared with this template.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Returns the renderer for this request.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

/// Collects a rendered response and converts it into an axum [`Response`].
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    inner: BufferedResponse,
}

impl ResponseBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseSink for ResponseBuilder {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.set_header(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        self.inner.write_status(status);
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_body(bytes)
    }
}

impl IntoResponse for ResponseBuilder {
    fn into_response(self) -> Response {
        let (status, headers, body) = self.inner.into_parts();
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl<S> FromRequestParts<S> for Template
where
    S: Send + Sync,
{
    type Rejection = MissingMiddleware;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Template>()
            .cloned()
            .ok_or(MissingMiddleware("Template"))
    }
}

impl<S> FromRequestParts<S> for Data
where
    S: Send + Sync,
{
    type Rejection = MissingMiddleware;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Data>()
            .cloned()
            .ok_or(MissingMiddleware("Data"))
    }
}
