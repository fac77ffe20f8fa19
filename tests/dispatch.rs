mod common;

use common::{app_router, get, router_from};
use pretty_assertions::assert_eq;
use route_engine::routing::{Collector, Container, RegistrationError};

#[test]
fn test_every_static_route_dispatches_to_itself() {
    let router = app_router();
    for entry in router.routes().entries().filter(|e| e.subdomain.is_none()) {
        let found = router
            .dispatch(&entry.full_path, entry.method.as_str(), None)
            .unwrap_or_else(|| panic!("{} did not dispatch", entry.full_path));
        assert_eq!(found.entry, entry);
        assert!(found.params.is_empty());
    }
}

#[test]
fn test_root_route() {
    let router = app_router();
    let found = router.dispatch("/", "GET", None).unwrap();

    assert_eq!(found.container(), "RoutesController");
    assert_eq!(found.action(), "index");
    assert_eq!(found.name(), "routes.index");
    let middleware: Vec<String> = found.entry.middleware.iter().map(|m| m.to_string()).collect();
    assert_eq!(middleware, vec!["auth"]);
}

#[test]
fn test_character_class_constraint() {
    let router = app_router();
    for n in 0..10 {
        let found = router.dispatch(&format!("/numbers/{}", n), "GET", None).unwrap();
        assert_eq!(found.action(), "numbers");
    }
    assert!(router.dispatch("/numbers/10", "GET", None).is_none());
    assert!(router.dispatch("/numbers/a", "GET", None).is_none());
}

#[test]
fn test_alternation_constraint() {
    let router = app_router();
    assert_eq!(router.dispatch("/colour/blue", "GET", None).unwrap().action(), "colour");
    assert_eq!(router.dispatch("/colour/red", "GET", None).unwrap().action(), "colour");
    assert!(router.dispatch("/colour/purple", "GET", None).is_none());
}

#[test]
fn test_params_are_positional() {
    let router = app_router();
    let found = router.dispatch("/user/A/B", "GET", None).unwrap();
    assert_eq!(found.params, vec!["A", "B"]);
}

#[test]
fn test_dotted_and_uuid_params() {
    let router = app_router();
    let found = router.dispatch("/repo/mantis.nvim", "GET", None).unwrap();
    assert_eq!(found.params, vec!["mantis.nvim"]);

    let uuid = "0b6f7a3e-1c2d-4e5f-8a9b-0c1d2e3f4a5b";
    let found = router.dispatch(&format!("/repo/{}", uuid), "GET", None).unwrap();
    assert_eq!(found.params, vec![uuid]);
}

#[test]
fn test_rejected_placeholder_characters() {
    let router = app_router();
    for c in ["@", "%23", "$", "%", "*", "!"] {
        assert!(router.dispatch(&format!("/repo/a{}b", c), "GET", None).is_none(), "{}", c);
    }
}

#[test]
fn test_case_sensitive_and_no_trailing_slash() {
    let router = app_router();
    assert!(router.dispatch("/Colour/blue", "GET", None).is_none());
    assert!(router.dispatch("/slug/x/", "GET", None).is_none());
    assert!(router.dispatch("/slug/x", "GET", None).is_some());
    assert!(router.dispatch("/repo/x/", "GET", None).is_none());
}

#[test]
fn test_method_is_case_insensitive() {
    let router = app_router();
    assert!(router.dispatch("/slug/x", "get", None).is_some());
    assert!(router.dispatch("/slug/x", "POST", None).is_none());
}

#[test]
fn test_duplicate_name_across_containers_fails() {
    let a = Container::builder("A").endpoint(get("/a", "a").named("shared")).build();
    let b = Container::builder("B").endpoint(get("/b", "b").named("shared")).build();

    let mut collector = Collector::new();
    let err = collector.register_all(&[a, b]).unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateName { .. }));
    assert!(err.to_string().contains("A@a"));
    assert!(err.to_string().contains("B@b"));
}

#[test]
fn test_search_uri() {
    let router = app_router();
    assert_eq!(router.search_uri("routes.id", &[420.to_string()]).as_deref(), Some("/id/420"));
    assert_eq!(router.search_uri("routes.user", &["A"]).as_deref(), Some("/user/A/{token}"));
    assert_eq!(router.search_uri("routes.index", &[] as &[&str]).as_deref(), Some("/"));
    assert_eq!(router.search_uri("routes.missing", &["1"]), None);
}

#[test]
fn test_subdomain_literal_from_group() {
    let router = app_router();
    let found = router.dispatch("/v1/hooks/status", "GET", Some("api.example.com")).unwrap();
    assert_eq!(found.container(), "WebhookController");
    assert_eq!(found.name(), "api.hooks.status");
    assert!(found.params.is_empty());

    assert!(router.dispatch("/v1/hooks/status", "GET", Some("api.example.com:8080")).is_some());
    assert!(router.dispatch("/v1/hooks/status", "GET", Some("example.com")).is_none());
    assert!(router.dispatch("/v1/hooks/status", "GET", Some("localhost")).is_none());
    assert!(router.dispatch("/v1/hooks/status", "GET", None).is_none());
}

#[test]
fn test_route_subdomain_overrides_group() {
    let router = app_router();
    let found = router.dispatch("/v1/hooks/github", "POST", Some("hooks.example.com")).unwrap();
    assert_eq!(found.action(), "github");
    assert!(router.dispatch("/v1/hooks/github", "POST", Some("api.example.com")).is_none());
}

#[test]
fn test_wildcard_subdomain_is_first_param() {
    let router = app_router();
    let found = router.dispatch("/project/42", "GET", Some("acme.example.com")).unwrap();
    assert_eq!(found.params, vec!["acme", "42"]);
    assert!(router.dispatch("/project/42", "GET", Some("localhost")).is_none());
    assert!(router.dispatch("/project/42", "GET", None).is_none());
}

#[test]
fn test_subdomain_not_reconstructed_by_name_lookup() {
    let router = app_router();
    assert_eq!(
        router.search_uri("projects.show", &["42"]).as_deref(),
        Some("/project/42")
    );
}

#[test]
fn test_first_path_match_wins() {
    let router = router_from(&[Container::builder("C")
        .endpoint(get("/files/{name}", "show"))
        .endpoint(get("/files/[a-z]+", "letters"))
        .build()]);

    assert_eq!(router.dispatch("/files/abc", "GET", None).unwrap().action(), "show");
}
