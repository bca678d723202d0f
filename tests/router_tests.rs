mod common;

use http::Method;
use restmux::endpoint::{EndpointDescriptor, ServiceDescriptor};
use restmux::registry::RegistryBuilder;
use restmux::router::Router;
use std::sync::Arc;

fn router_for(endpoints: &[(Method, &str)]) -> Router {
    common::init_tracing();
    let mut builder = RegistryBuilder::new();
    let svc = builder.register_service(ServiceDescriptor::new("TestService"));
    for (index, (method, template)) in endpoints.iter().enumerate() {
        builder
            .register_endpoint(
                &svc,
                EndpointDescriptor::new(method.clone(), template).handler_index(index),
            )
            .unwrap();
    }
    Router::new(Arc::new(builder.seal()))
}

#[test]
fn test_round_trip_registration_and_lookup() {
    let router = router_for(&[
        (Method::GET, "/zoo/animals"),
        (Method::GET, "/zoo/animals/{id}"),
        (Method::GET, "/zoo/animals/{id}/toys/{toy}"),
    ]);

    let m = router.resolve(&Method::GET, "/zoo/animals", "").unwrap();
    assert_eq!(m.endpoint.signature, "/zoo/animals");
    assert!(m.path_params.is_empty());

    let m = router.resolve(&Method::GET, "/zoo/animals/123", "").unwrap();
    assert_eq!(m.endpoint.handler_index, 1);
    assert_eq!(m.get_path_param("id"), Some("123"));

    let m = router
        .resolve(&Method::GET, "/zoo/animals/123/toys/ball", "")
        .unwrap();
    assert_eq!(m.endpoint.handler_index, 2);
    // Values come back in declared order.
    assert_eq!(m.get_path_param("id"), Some("123"));
    assert_eq!(m.get_path_param("toy"), Some("ball"));
    assert_eq!(m.path_params[0].1, "123");
    assert_eq!(m.path_params[1].1, "ball");
}

#[test]
fn test_method_filters_candidates() {
    let router = router_for(&[
        (Method::GET, "/zoo/animals"),
        (Method::POST, "/zoo/animals"),
    ]);
    let m = router.resolve(&Method::POST, "/zoo/animals", "").unwrap();
    assert_eq!(m.endpoint.handler_index, 1);
    assert!(router.resolve(&Method::PUT, "/zoo/animals", "").is_none());
}

#[test]
fn test_unknown_path_resolves_to_none() {
    let router = router_for(&[(Method::GET, "/zoo/animals")]);
    assert!(router.resolve(&Method::GET, "/does/not/exist", "").is_none());
    assert!(router.resolve(&Method::GET, "/zoo/animals/extra", "").is_none());
    assert!(router.resolve(&Method::GET, "/zoo", "").is_none());
}

#[test]
fn test_variable_length_capture() {
    let router = router_for(&[(Method::GET, "/a/{rest...}")]);

    let m = router.resolve(&Method::GET, "/a/1/2/3", "").unwrap();
    assert_eq!(m.path_param_values("rest"), vec!["1", "2", "3"]);
    // Last write wins for the scalar accessor.
    assert_eq!(m.get_path_param("rest"), Some("3"));

    let m = router.resolve(&Method::GET, "/a/solo", "").unwrap();
    assert_eq!(m.path_param_values("rest"), vec!["solo"]);

    // The trailing slot needs at least one segment.
    assert!(router.resolve(&Method::GET, "/a", "").is_none());
}

#[test]
fn test_variable_length_respects_static_prefix() {
    let router = router_for(&[(Method::GET, "/files/archive/{rest...}")]);
    assert!(router.resolve(&Method::GET, "/files/other/x", "").is_none());
    assert!(router
        .resolve(&Method::GET, "/files/archive/x/y", "")
        .is_some());
}

#[test]
fn test_query_values_never_affect_matching() {
    let router = router_for(&[(Method::GET, "/search?{q}&{limit}")]);

    for query in ["", "q=cats", "q=cats&limit=10", "unrelated=1", "limit=&q="] {
        let m = router.resolve(&Method::GET, "/search", query);
        assert!(m.is_some(), "query '{}' broke path matching", query);
    }

    let m = router.resolve(&Method::GET, "/search", "q=cats").unwrap();
    assert_eq!(m.get_query_param("q"), Some("cats"));
    // Declared but absent binds to the empty string, never an error.
    assert_eq!(m.get_query_param("limit"), Some(""));
    // Unknown keys are ignored.
    let m = router
        .resolve(&Method::GET, "/search", "q=cats&debug=true")
        .unwrap();
    assert_eq!(m.get_query_param("debug"), None);
}

#[test]
fn test_ambiguous_match_tie_break_is_first_registered() {
    // A parameter slot and a literal can both match the same path; the
    // winner is whichever was registered first, deterministically.
    let router = router_for(&[(Method::GET, "/a/{x}"), (Method::GET, "/a/b")]);
    for _ in 0..16 {
        let m = router.resolve(&Method::GET, "/a/b", "").unwrap();
        assert_eq!(m.endpoint.signature, "/a/{}");
    }

    let router = router_for(&[(Method::GET, "/a/b"), (Method::GET, "/a/{x}")]);
    for _ in 0..16 {
        let m = router.resolve(&Method::GET, "/a/b", "").unwrap();
        assert_eq!(m.endpoint.signature, "/a/b");
    }
}

#[test]
fn test_xsrf_token_extracted_as_side_channel() {
    // The token is picked up whether or not the endpoint declares any
    // query parameters.
    let router = router_for(&[(Method::GET, "/plain"), (Method::GET, "/search?{q}")]);

    let m = router
        .resolve(&Method::GET, "/plain", "xsrft=tok123")
        .unwrap();
    assert_eq!(m.xsrf_token.as_deref(), Some("tok123"));

    let m = router
        .resolve(&Method::GET, "/search", "q=cats&xsrft=tok456")
        .unwrap();
    assert_eq!(m.xsrf_token.as_deref(), Some("tok456"));
    assert_eq!(m.get_query_param("xsrft"), None);

    let m = router.resolve(&Method::GET, "/plain", "").unwrap();
    assert_eq!(m.xsrf_token, None);
}

#[test]
fn test_root_endpoint_matches_bare_slash() {
    let router = router_for(&[(Method::GET, "/")]);
    let m = router.resolve(&Method::GET, "/", "").unwrap();
    assert_eq!(m.endpoint.signature, "/");
    assert!(router.resolve(&Method::GET, "/anything", "").is_none());
}
