use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tokio::time::sleep;

/// Holds every request for a fixed `delay` before passing it on, to simulate
/// network latency. A zero delay skips the timer entirely.
pub async fn delay(State(delay): State<Duration>, request: Request, next: Next) -> Response {
    if !delay.is_zero() {
        sleep(delay).await;
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{
        body::Body, http, http::StatusCode, middleware::from_fn_with_state, routing::get, Router,
    };
    use std::time::Instant;
    use tower::ServiceExt;

    fn app(latency: Duration) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn_with_state(latency, delay))
    }

    #[tokio::test]
    async fn delays_requests() -> Result<()> {
        let started = Instant::now();
        let response = app(Duration::from_millis(50))
            .oneshot(http::Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(50));
        Ok(())
    }

    #[tokio::test]
    async fn zero_delay_passes_through() -> Result<()> {
        let response = app(Duration::ZERO)
            .oneshot(http::Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
