use crate::api::handlers::{health, not_found};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::{from_fn_with_state, map_response},
    response::Response,
    routing::get,
    Extension, Router,
};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod context;
pub mod error;
pub(crate) mod handlers;
mod latency;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use context::{ApiConfig, AppContext, DeploymentMode};
pub use openapi::openapi;

pub const DOCS_PATH: &str = "/api-docs";
pub const DOCS_JSON_PATH: &str = "/api-docs/openapi.json";

const REQUEST_ID: &str = "x-request-id";

/// Compose the whole application.
///
/// Order, outermost first: request id and tracing for everything; Swagger UI
/// and `/health` answer without delay; every other request waits for the
/// configured latency, then reaches the auth routes (errors formatted by
/// [`error::handle_errors`]) or the not-found fallback. A known path called
/// with the wrong method answers the same JSON 404 as an unknown one.
#[must_use]
pub fn router(ctx: AppContext) -> Router {
    let ctx = Arc::new(ctx);
    let config = ctx.config().clone();

    let (auth_routes, openapi) = openapi::api_router(config.server_url()).split_for_parts();

    let delayed = auth_routes
        .fallback(not_found)
        .layer(from_fn_with_state(config.mode(), error::handle_errors))
        .layer(from_fn_with_state(config.latency(), latency::delay))
        .layer(Extension(ctx));

    Router::new()
        .merge(SwaggerUi::new(DOCS_PATH).url(DOCS_JSON_PATH, openapi))
        .route("/health", get(health))
        .merge(delayed)
        .layer(map_response(method_mismatch_as_not_found))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
}

// A known path with the wrong method is still an unmatched route.
async fn method_mismatch_as_not_found(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        not_found::not_found_response()
    } else {
        response
    }
}

/// Bind `port` on all interfaces and serve until Ctrl-C / SIGTERM.
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, ctx: AppContext) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    serve(listener, ctx, shutdown_signal()).await
}

/// Serve the application on an already bound listener.
/// # Errors
/// Return error if the server fails
pub async fn serve<F>(listener: TcpListener, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(ctx);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
