//! Rendering templates to HTTP responses.
//!
//! [`Renderer`] pairs a compiled [`TemplateSet`] with the response settings
//! (content type, environment) and a shared [`BufferPool`].
//!
//! # Rendering
//!
//! [`Renderer::render`] executes a template into a pooled buffer first. Only
//! when execution succeeds are the headers, status and body written to the
//! [`ResponseSink`]; a failing template therefore never leaves half a page on
//! the wire.
//!
//! | Outcome | Response | Logged |
//! |---------|----------|--------|
//! | success | configured content type, requested status, rendered body | no |
//! | unknown template / runtime error | `500`, error text in development, `Internal Server Error` otherwise | yes |
//! | body write fails | status already sent, nothing else happens | yes |
//!
//! # Render Duration
//!
//! Every render injects [`RENDER_DURATION_KEY`] into the context: a function
//! returning the time elapsed since `render` was called, formatted as
//! `"<millis>ms"`. Templates display it with `{{ RenderDuration() }}`.

use std::sync::Arc;
use std::time::Instant;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use minijinja::Value;

use crate::data::{DataMap, RENDER_DURATION_KEY};
use crate::env::Env;
use crate::error::{Error, Result};
use crate::pool::BufferPool;
use crate::sink::{write_error, ResponseSink};
use crate::template::TemplateSet;

/// Default response content type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Renders named templates from a compiled set.
///
/// Cloning is cheap: the template set and buffer pool are shared.
#[derive(Debug, Clone)]
pub struct Renderer {
    set: Arc<TemplateSet>,
    pool: Arc<BufferPool>,
    content_type: HeaderValue,
    env: Env,
}

impl Renderer {
    /// Creates a renderer with the default content type and a fresh pool.
    pub fn new(set: Arc<TemplateSet>, env: Env) -> Self {
        Self {
            set,
            pool: Arc::new(BufferPool::new()),
            content_type: HeaderValue::from_static("text/html; charset=utf-8"),
            env,
        }
    }

    /// Sets the content type. `"; charset=utf-8"` is appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentType`] if the value is not a valid header.
    pub fn with_content_type(mut self, content_type: &str) -> Result<Self> {
        let value = format!("{}; charset=utf-8", content_type);
        self.content_type = HeaderValue::from_str(&value).map_err(|source| Error::ContentType {
            value: content_type.to_string(),
            source,
        })?;
        Ok(self)
    }

    /// Shares `pool` instead of the renderer's own pool.
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Returns a renderer using `set` and otherwise identical settings.
    ///
    /// Used to swap in a freshly recompiled set for a single request.
    pub fn with_set(&self, set: Arc<TemplateSet>) -> Self {
        Self {
            set,
            pool: Arc::clone(&self.pool),
            content_type: self.content_type.clone(),
            env: self.env,
        }
    }

    /// Returns the template set.
    pub fn template_set(&self) -> &Arc<TemplateSet> {
        &self.set
    }

    /// Returns the buffer pool.
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Returns the full `Content-Type` header value.
    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    /// Returns the runtime environment.
    pub fn env(&self) -> Env {
        self.env
    }

    /// Renders `name` with `data` and writes the response to `sink`.
    ///
    /// Errors are answered on the sink and logged; see the module docs.
    pub fn render(
        &self,
        status: StatusCode,
        name: &str,
        data: &DataMap,
        sink: &mut dyn ResponseSink,
    ) {
        let started = Instant::now();
        let mut buf = self.pool.acquire();

        if let Err(err) = self.execute(name, data, started, &mut buf) {
            tracing::error!(error = %err, template = name, "failed to render template");
            let body = if self.env.is_development() {
                err.to_string()
            } else {
                canonical_reason(StatusCode::INTERNAL_SERVER_ERROR).to_string()
            };
            write_error(sink, StatusCode::INTERNAL_SERVER_ERROR, &body);
            return;
        }

        sink.set_header(CONTENT_TYPE, self.content_type.clone());
        sink.write_status(status);
        if let Err(err) = sink.write_body(&buf) {
            tracing::error!(error = %err, template = name, "failed to write out rendered template");
        }
    }

    /// Renders `name` with `data` and returns the output as a string.
    pub fn render_to_string(&self, name: &str, data: &DataMap) -> Result<String> {
        let mut buf = self.pool.acquire();
        self.execute(name, data, Instant::now(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn execute(
        &self,
        name: &str,
        data: &DataMap,
        started: Instant,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let duration = Value::from_function(move || {
            format!("{}ms", started.elapsed().as_millis())
        });
        let ctx = data.with_injected(&[(RENDER_DURATION_KEY, duration)]);
        self.set.render_to(name, &ctx, out)
    }
}

fn canonical_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferedResponse;
    use crate::template::{compile, CompileOptions};
    use crate::{File, FileSystem};
    use std::io;

    fn renderer(files: Vec<File>, env: Env) -> Renderer {
        let set = compile(&FileSystem::from_files(files), &CompileOptions::new()).unwrap();
        Renderer::new(Arc::new(set), env)
    }

    struct FailingSink {
        inner: BufferedResponse,
    }

    impl ResponseSink for FailingSink {
        fn set_header(&mut self, name: http::HeaderName, value: HeaderValue) {
            self.inner.set_header(name, value);
        }

        fn write_status(&mut self, status: StatusCode) {
            self.inner.write_status(status);
        }

        fn write_body(&mut self, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }
    }

    #[test]
    fn test_render_success() {
        let r = renderer(
            vec![File::new("home", ".tmpl", "Hello, {{ Name }}!")],
            Env::Production,
        );
        let mut data = DataMap::new();
        data.insert("Name", "Flamego");

        let mut response = BufferedResponse::new();
        r.render(StatusCode::OK, "home", &data, &mut response);

        let (status, headers, body) = response.into_parts();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body, b"Hello, Flamego!");
    }

    #[test]
    fn test_render_custom_status_and_content_type() {
        let r = renderer(vec![File::new("feed", ".tmpl", "<rss/>")], Env::Production)
            .with_content_type("application/rss+xml")
            .unwrap();

        let mut response = BufferedResponse::new();
        r.render(StatusCode::ACCEPTED, "feed", &DataMap::new(), &mut response);

        assert_eq!(response.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/rss+xml; charset=utf-8"
        );
    }

    #[test]
    fn test_invalid_content_type() {
        let r = renderer(vec![], Env::Production);
        assert!(matches!(
            r.with_content_type("text/html\n"),
            Err(Error::ContentType { .. })
        ));
    }

    #[test]
    fn test_render_unknown_template_production() {
        let r = renderer(vec![], Env::Production);

        let mut response = BufferedResponse::new();
        r.render(StatusCode::OK, "missing", &DataMap::new(), &mut response);

        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(response.body(), b"Internal Server Error");
    }

    #[test]
    fn test_render_runtime_error_development() {
        let r = renderer(
            vec![File::new("home", ".tmpl", "before {{ Missing }} after")],
            Env::Development,
        );

        let mut response = BufferedResponse::new();
        r.render(StatusCode::OK, "home", &DataMap::new(), &mut response);

        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("home"));
        assert!(!body.contains("before"));
    }

    #[test]
    fn test_render_duration_is_injected() {
        let r = renderer(
            vec![File::new("home", ".tmpl", "{{ RenderDuration() }}")],
            Env::Production,
        );

        let out = r.render_to_string("home", &DataMap::new()).unwrap();

        assert!(out.ends_with("ms"), "unexpected output {:?}", out);
        assert!(out.trim_end_matches("ms").parse::<u128>().is_ok());
    }

    #[test]
    fn test_render_duration_overrides_user_key() {
        let r = renderer(
            vec![File::new("home", ".tmpl", "{{ RenderDuration() }}")],
            Env::Production,
        );
        let mut data = DataMap::new();
        data.insert("RenderDuration", "not callable");

        assert!(r.render_to_string("home", &data).unwrap().ends_with("ms"));
    }

    #[test]
    fn test_write_failure_keeps_status() {
        let r = renderer(vec![File::new("home", ".tmpl", "body")], Env::Production);

        let mut sink = FailingSink {
            inner: BufferedResponse::new(),
        };
        r.render(StatusCode::OK, "home", &DataMap::new(), &mut sink);

        assert_eq!(sink.inner.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_buffers_do_not_leak_between_renders() {
        let r = renderer(
            vec![
                File::new("long", ".tmpl", "a long body that fills the buffer"),
                File::new("short", ".tmpl", "x"),
                File::new("broken", ".tmpl", "partial {{ Missing }}"),
            ],
            Env::Production,
        );

        for _ in 0..10 {
            assert_eq!(
                r.render_to_string("long", &DataMap::new()).unwrap(),
                "a long body that fills the buffer"
            );
            assert!(r.render_to_string("broken", &DataMap::new()).is_err());
            assert_eq!(r.render_to_string("short", &DataMap::new()).unwrap(), "x");
        }
        assert_eq!(r.pool().idle(), 1);
    }
}
