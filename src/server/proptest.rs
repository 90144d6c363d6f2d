//! Property-Based Tests for Routing
//!
//! # Test Properties
//!
//! 1. **Root Only**: the home handler answers 404 for every path except `/`
//! 2. **Exact Match**: fixed routes never match with a suffix appended
//! 3. **Accounting**: every routed request is counted exactly once, under the
//!    status it actually produced

#![cfg(test)]

use std::sync::Arc;

use hyper::service::Service;
use hyper::{Method, Request, StatusCode};
use proptest::prelude::*;

use super::handlers;
use super::{App, Instrumented};
use crate::downstream::DownstreamClient;
use crate::environment::{StaticEnvironment, FOO_SERVICE_ADDR};
use crate::metrics::HttpMetrics;

// =============================================================================
// Property Strategies
// =============================================================================

/// Absolute paths other than `/`
fn non_root_path_strategy() -> impl Strategy<Value = String> {
    "/[a-zA-Z0-9_.~-]{1,24}(/[a-zA-Z0-9_.~-]{0,12}){0,3}"
}

fn method_strategy() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::GET),
        Just(Method::POST),
        Just(Method::PUT),
        Just(Method::DELETE),
        Just(Method::PATCH),
    ]
}

fn app() -> App {
    // The peer is unreachable; any attempt to call it would show up as a
    // failed section, never as a 404
    let env = StaticEnvironment::new("pod-1").with_var(FOO_SERVICE_ADDR, "127.0.0.1:1");
    App::new(
        Arc::new(HttpMetrics::new().unwrap()),
        DownstreamClient::new(),
        Arc::new(env),
    )
}

// =============================================================================
// Routing Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_home_non_root_is_404(path in non_root_path_strategy()) {
        let env = StaticEnvironment::new("pod-1");
        let response = tokio_test::block_on(handlers::home(&path, &env, &DownstreamClient::new()));

        prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn prop_fixed_routes_need_exact_match(suffix in "[a-z0-9/_]{1,8}") {
        let app = app();

        for route in ["/cause_500", "/redirect_me", "/metrics"] {
            let uri = format!("{}{}", route, suffix);
            let req = Request::builder().uri(&uri).body(()).unwrap();
            let response = tokio_test::block_on(app.call(req)).unwrap();

            prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn prop_each_request_counted_once(
        requests in prop::collection::vec((method_strategy(), 0usize..3), 1..20)
    ) {
        let app = app();
        let svc = Instrumented::new(app.clone(), app.metrics().clone(), "127.0.0.1:4000".parse().unwrap());

        let mut expected_500 = 0u64;
        let mut expected_302 = 0u64;
        let mut expected_404 = 0u64;

        for (method, route) in &requests {
            let path = match route {
                0 => { expected_500 += 1; "/cause_500" }
                1 => { expected_302 += 1; "/redirect_me" }
                _ => { expected_404 += 1; "/nowhere" }
            };
            let req = Request::builder().method(method.clone()).uri(path).body(()).unwrap();
            tokio_test::block_on(svc.call(req)).unwrap();
        }

        let metrics = app.metrics();
        let total = |code: &str| -> u64 {
            [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]
                .iter()
                .map(|m| metrics.responses_total(code, m.as_str()))
                .sum()
        };

        prop_assert_eq!(total("500"), expected_500);
        prop_assert_eq!(total("302"), expected_302);
        prop_assert_eq!(total("404"), expected_404);
        prop_assert_eq!(total("200"), 0);
    }
}
