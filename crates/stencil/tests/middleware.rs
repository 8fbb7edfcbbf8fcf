//! Integration tests for the template middleware.

use std::fs;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use stencil::{
    Data, Delimiters, Env, File, FileSystem, FunctionTable, Options, Template, Templater,
};
use tempfile::TempDir;
use tower::ServiceExt;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

async fn home(template: Template, data: Data) -> Response {
    data.insert("Name", "Flamego");
    template.html(StatusCode::OK, "home")
}

async fn created(template: Template) -> Response {
    template.data().insert("Name", "Flamego");
    template.html(StatusCode::CREATED, "home")
}

async fn missing(template: Template) -> Response {
    template.html(StatusCode::OK, "does/not/exist")
}

fn app(templater: Templater) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/created", get(created))
        .route("/missing", get(missing))
        .layer(middleware::from_fn_with_state(templater, stencil::inject))
}

async fn get_body(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

fn directory_templater(dir: &Path, env: Env) -> Templater {
    let options = Options::new().with_directory(dir.to_string_lossy());
    Templater::new(options, env).unwrap()
}

#[tokio::test]
async fn test_hello_page() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "Hello, {{ Name }}!");
    let app = app(directory_templater(dir.path(), Env::Production));

    let (status, content_type, body) = get_body(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(body, "Hello, Flamego!");
}

#[tokio::test]
async fn test_status_is_passed_through() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "Hello, {{ Name }}!");
    let app = app(directory_templater(dir.path(), Env::Production));

    let (status, _, body) = get_body(&app, "/created").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "Hello, Flamego!");
}

#[tokio::test]
async fn test_unknown_template_production() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "Hello");
    let app = app(directory_templater(dir.path(), Env::Production));

    let (status, content_type, body) = get_body(&app, "/missing").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_unknown_template_development_shows_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "Hello");
    let app = app(directory_templater(dir.path(), Env::Development));

    let (status, _, body) = get_body(&app, "/missing").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("does/not/exist"), "body: {}", body);
}

#[tokio::test]
async fn test_runtime_error_sends_no_partial_output() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "<h1>partial</h1>{{ Undefined.field }}");
    let app = app(directory_templater(dir.path(), Env::Production));

    let (status, _, body) = get_body(&app, "/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("partial"));
}

#[tokio::test]
async fn test_development_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "v1 {{ Name }}");
    let app = app(directory_templater(dir.path(), Env::Development));

    assert_eq!(get_body(&app, "/").await.2, "v1 Flamego");

    write(dir.path(), "home.tmpl", "v2 {{ Name }}");
    assert_eq!(get_body(&app, "/").await.2, "v2 Flamego");
}

#[tokio::test]
async fn test_production_ignores_edits() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "v1 {{ Name }}");
    let app = app(directory_templater(dir.path(), Env::Production));

    assert_eq!(get_body(&app, "/").await.2, "v1 Flamego");

    write(dir.path(), "home.tmpl", "v2 {{ Name }}");
    assert_eq!(get_body(&app, "/").await.2, "v1 Flamego");
}

#[tokio::test]
async fn test_development_recompile_failure() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "v1 {{ Name }}");
    let templater = directory_templater(dir.path(), Env::Development);
    let app = app(templater.clone());

    write(dir.path(), "home.tmpl", "{% if %}");
    let (status, _, body) = get_body(&app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("template: "), "body: {}", body);

    // The set compiled at setup is untouched.
    assert!(templater.shared_set().contains("home"));

    write(dir.path(), "home.tmpl", "v3 {{ Name }}");
    assert_eq!(get_body(&app, "/").await.2, "v3 Flamego");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_development_concurrent_recompiles() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "home.tmpl", "live {{ Name }}");
    let app = app(directory_templater(dir.path(), Env::Development));

    let (a, b, c) = tokio::join!(
        get_body(&app, "/"),
        get_body(&app, "/created"),
        get_body(&app, "/"),
    );

    assert_eq!(a.2, "live Flamego");
    assert_eq!(b.0, StatusCode::CREATED);
    assert_eq!(c.2, "live Flamego");
}

#[tokio::test]
async fn test_development_new_template_appears() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "other.tmpl", "other");
    let app = app(directory_templater(dir.path(), Env::Development));

    assert_eq!(get_body(&app, "/").await.0, StatusCode::INTERNAL_SERVER_ERROR);

    write(dir.path(), "home.tmpl", "now {{ Name }}");
    assert_eq!(get_body(&app, "/").await.2, "now Flamego");
}

#[tokio::test]
async fn test_overlay_directories() {
    let primary = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let custom = TempDir::new().unwrap();
    write(primary.path(), "home.tmpl", "primary {{ Name }}");
    write(base.path(), "home.tmpl", "base {{ Name }}");
    write(custom.path(), "home.tmpl", "custom {{ Name }}");

    let options = Options::new()
        .with_directory(primary.path().to_string_lossy())
        .with_append_directory(base.path().to_string_lossy())
        .with_append_directory(custom.path().to_string_lossy())
        .with_append_directory("/nonexistent/overlay");
    let app = app(Templater::new(options, Env::Production).unwrap());

    assert_eq!(get_body(&app, "/").await.2, "custom Flamego");
}

#[tokio::test]
async fn test_file_system_options() {
    let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "[[ Shout(Name) ]]")]);
    let options = Options::new()
        .with_file_system(fs)
        .with_delimiters(Delimiters::new("[[", "]]"))
        .with_function_table(
            FunctionTable::new().function("Shout", |s: String| s.to_uppercase()),
        );
    let app = app(Templater::new(options, Env::Development).unwrap());

    assert_eq!(get_body(&app, "/").await.2, "FLAMEGO");
}

#[tokio::test]
async fn test_render_duration_is_available() {
    let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "{{ RenderDuration() }}")]);
    let app = app(Templater::new(Options::new().with_file_system(fs), Env::Production).unwrap());

    let (status, _, body) = get_body(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.ends_with("ms"), "body: {}", body);
}

#[tokio::test]
async fn test_custom_content_type() {
    let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "<b>{{ Name }}</b>")]);
    let options = Options::new()
        .with_file_system(fs)
        .with_content_type("text/plain");
    let app = app(Templater::new(options, Env::Production).unwrap());

    let (_, content_type, body) = get_body(&app, "/").await;

    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "<b>Flamego</b>");
}

#[tokio::test]
async fn test_extractors_without_middleware() {
    let app = Router::new().route("/", get(home));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Template"));
}

#[tokio::test]
async fn test_data_is_per_request() {
    async fn count(template: Template, data: Data) -> Response {
        let seen = data.get("Seen").is_some();
        data.insert("Seen", true);
        data.insert("Name", if seen { "again" } else { "first" });
        template.html(StatusCode::OK, "home")
    }

    let fs = FileSystem::from_files(vec![File::new("home", ".tmpl", "{{ Name }}")]);
    let templater = Templater::new(Options::new().with_file_system(fs), Env::Production).unwrap();
    let app = Router::new()
        .route("/", get(count))
        .layer(middleware::from_fn_with_state(templater, stencil::inject));

    assert_eq!(get_body(&app, "/").await.2, "first");
    assert_eq!(get_body(&app, "/").await.2, "first");
}
