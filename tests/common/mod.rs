//! Shared route fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use route_engine::routing::{
    Collector, Container, EndpointDescriptor, GroupDescriptor, HttpMethod, Router,
    SubdomainConstraint,
};

pub fn get(path: &str, action: &str) -> EndpointDescriptor {
    EndpointDescriptor::new(HttpMethod::Get, path, action)
}

/// Containers mirroring a small application.
pub fn app_containers() -> Vec<Arc<Container>> {
    let routes = Container::builder("RoutesController")
        .group(GroupDescriptor::new().name_prefix("routes").middleware(["auth"]))
        .endpoint(get("/", "index").named("index"))
        .endpoint(get("/numbers/[0-9]", "numbers").named("numbers"))
        .endpoint(get("/colour/(blue|red)", "colour").named("colour"))
        .endpoint(get("/user/{uuid}/{token}", "user").named("user"))
        .endpoint(get("/repo/{repo}", "repo").named("repo"))
        .endpoint(get("/id/{id}", "id").named("id"))
        .endpoint(get("/slug/x", "slug").named("slug"))
        .build();

    let api_base = Container::builder("ApiController")
        .abstract_base()
        .group(
            GroupDescriptor::new()
                .path_prefix("/v1")
                .name_prefix("api")
                .middleware(["api"])
                .subdomain(SubdomainConstraint::Literal("api".into())),
        )
        .endpoint(get("/status", "status").named("status"))
        .build();

    let webhooks = Container::builder("WebhookController")
        .extends(Arc::clone(&api_base))
        .group(GroupDescriptor::new().path_prefix("/hooks").name_prefix("hooks"))
        .endpoint(
            EndpointDescriptor::new(HttpMethod::Post, "/github", "github")
                .named("github")
                .subdomain(SubdomainConstraint::Literal("hooks".into())),
        )
        .build();

    let projects = Container::builder("ProjectController")
        .group(
            GroupDescriptor::new()
                .name_prefix("projects")
                .subdomain(SubdomainConstraint::Wildcard("tenant".into())),
        )
        .endpoint(get("/project/{id}", "show").named("show"))
        .build();

    vec![routes, api_base, webhooks, projects]
}

pub fn router_from(containers: &[Arc<Container>]) -> Router {
    let mut collector = Collector::new();
    collector
        .register_all(containers)
        .expect("fixture routes register");
    Router::new(collector.into_table())
}

pub fn app_router() -> Router {
    router_from(&app_containers())
}
