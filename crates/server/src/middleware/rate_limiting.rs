use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use claims_core::middleware::RateLimiter;
use std::{net::SocketAddr, sync::Arc};

/// Rate limiting middleware that enforces the per-IP read budget.
///
/// # Errors
///
/// Returns `StatusCode::TOO_MANY_REQUESTS` when the rate limit is exceeded
/// for the client IP.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(rate_limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let key = addr.ip().to_string();

    if !rate_limiter.check_rate_limit(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::{
        net::{IpAddr, Ipv4Addr, SocketAddr},
        time::Duration,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "success"
    }

    fn test_app(limiter: Arc<RateLimiter>) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
    }

    fn test_request(addr: SocketAddr) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn allows_requests_under_the_limit() {
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        let app = test_app(rate_limiter);

        for _ in 0..5 {
            let response = app.clone().oneshot(test_request(addr)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn blocks_requests_over_the_limit() {
        let rate_limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(60)));
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        let app = test_app(rate_limiter);

        for _ in 0..2 {
            let response = app.clone().oneshot(test_request(addr)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(test_request(addr)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn different_ips_have_separate_limits() {
        let rate_limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
        let addr1 = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        let addr2 = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)), 8080);
        let app = test_app(rate_limiter);

        let response = app.clone().oneshot(test_request(addr1)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(test_request(addr2)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(test_request(addr1)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
