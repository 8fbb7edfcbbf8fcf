//! The middleware factory.
//!
//! [`Templater::new`] compiles the configured templates once, up front, and
//! decides how every later request obtains its template set:
//!
//! | Environment | Template source | Strategy |
//! |-------------|-----------------|----------|
//! | development | directories | [`CompileStrategy::RecompilePerRequest`] |
//! | development | pre-built file system | [`CompileStrategy::Fixed`] |
//! | production / test | any | [`CompileStrategy::Fixed`] |
//!
//! Recompiling per request makes template edits on disk visible on the next
//! request without restarting the server. The recompilation runs on tokio's
//! blocking pool so it does not stall the async workers. A failed recompilation answers that
//! one request with a `500` and leaves the shared set alone.
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use http::StatusCode;
//! use stencil::{Data, Env, Options, Template, Templater};
//!
//! async fn home(template: Template, data: Data) -> axum::response::Response {
//!     data.insert("Name", "Flamego");
//!     template.html(StatusCode::OK, "home")
//! }
//!
//! # fn main() -> Result<(), stencil::SetupError> {
//! let templater = Templater::new(Options::new(), Env::Production)?;
//! let app: Router = Router::new()
//!     .route("/", get(home))
//!     .layer(middleware::from_fn_with_state(templater, stencil::inject));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use stencil_render::{compile, CompileOptions, Env, FileSystem, Renderer, TemplateSet};

use crate::error::SetupError;
use crate::handles::{Data, Template};
use crate::options::Options;

/// How a request obtains its template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStrategy {
    /// Every request uses the set compiled at setup.
    Fixed,
    /// Every request compiles a fresh set from the directories.
    RecompilePerRequest,
}

impl CompileStrategy {
    /// Picks the strategy for `options` in `env`.
    pub fn resolve(options: &Options, env: Env) -> Self {
        if env.is_development() && options.file_system.is_none() {
            CompileStrategy::RecompilePerRequest
        } else {
            CompileStrategy::Fixed
        }
    }
}

/// Compiled templates plus everything needed to recompile them.
///
/// Cloning is cheap; clones share the compiled set.
#[derive(Debug, Clone)]
pub struct Templater {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    options: Options,
    compile: CompileOptions,
    strategy: CompileStrategy,
    renderer: Renderer,
}

impl Templater {
    /// Parses `options`, compiles the templates and resolves the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Compile`] if the templates cannot be loaded or
    /// compiled, and [`SetupError::Renderer`] if the content type is invalid.
    pub fn new(options: Options, env: Env) -> Result<Self, SetupError> {
        let options = options.parse_defaults();
        let compile = options.compile_options();

        let set = compile_set(&options, &compile).map_err(|source| SetupError::Compile {
            origin: origin(&options),
            source,
        })?;

        let renderer = Renderer::new(Arc::new(set), env)
            .with_content_type(&options.content_type)
            .map_err(SetupError::Renderer)?;

        let strategy = CompileStrategy::resolve(&options, env);
        tracing::debug!(
            origin = %origin(&options),
            templates = renderer.template_set().len(),
            strategy = ?strategy,
            env = %env,
            "template middleware ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                options,
                compile,
                strategy,
                renderer,
            }),
        })
    }

    /// Returns the options with defaults applied.
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Returns the resolved strategy.
    pub fn strategy(&self) -> CompileStrategy {
        self.inner.strategy
    }

    /// Returns the set compiled at setup.
    pub fn shared_set(&self) -> &Arc<TemplateSet> {
        self.inner.renderer.template_set()
    }

    /// Returns the renderer to use for one request.
    ///
    /// # Errors
    ///
    /// Fails only under [`CompileStrategy::RecompilePerRequest`], when the
    /// templates on disk no longer load or compile.
    pub fn renderer(&self) -> stencil_render::Result<Renderer> {
        match self.inner.strategy {
            CompileStrategy::Fixed => Ok(self.inner.renderer.clone()),
            CompileStrategy::RecompilePerRequest => {
                let set = compile_set(&self.inner.options, &self.inner.compile)?;
                Ok(self.inner.renderer.with_set(Arc::new(set)))
            }
        }
    }
}

/// Axum middleware injecting [`Template`] and [`Data`] into every request.
///
/// Install with `axum::middleware::from_fn_with_state(templater, stencil::inject)`.
///
/// Under [`CompileStrategy::RecompilePerRequest`] the directory walk and
/// compilation run on tokio's blocking pool.
pub async fn inject(State(templater): State<Templater>, mut req: Request, next: Next) -> Response {
    let renderer = match request_renderer(&templater).await {
        Ok(renderer) => renderer,
        Err(message) => {
            tracing::error!(error = %message, "failed to recompile templates");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("template: {}", message),
            )
                .into_response();
        }
    };

    let data = Data::new();
    req.extensions_mut().insert(Template::new(renderer, data.clone()));
    req.extensions_mut().insert(data);
    next.run(req).await
}

async fn request_renderer(templater: &Templater) -> Result<Renderer, String> {
    match templater.strategy() {
        CompileStrategy::Fixed => templater.renderer().map_err(|e| e.to_string()),
        CompileStrategy::RecompilePerRequest => {
            let templater = templater.clone();
            match tokio::task::spawn_blocking(move || templater.renderer()).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(join) => Err(join.to_string()),
            }
        }
    }
}

fn compile_set(options: &Options, compile_options: &CompileOptions) -> stencil_render::Result<TemplateSet> {
    match &options.file_system {
        Some(fs) => compile(fs, compile_options),
        None => {
            let fs = FileSystem::from_dirs(
                &options.directory,
                &options.append_directories,
                &options.extensions,
            )?;
            compile(&fs, compile_options)
        }
    }
}

fn origin(options: &Options) -> String {
    match &options.file_system {
        Some(_) => "file system".to_string(),
        None => format!("directory {:?}", options.directory),
    }
}
