mod common;

use common::FakePlatform;
use serde_json::json;
use tutum_deploy::links::{self, Linker, ServiceLink};
use tutum_deploy::variables::{Resolution, VariableStore};

const LB: &str = "lb.yniche-staging-solo";

fn platform_with_links() -> FakePlatform {
    FakePlatform::new()
        .service(
            LB,
            json!({
                "name": "lb",
                "linked_to_service": [
                    {"from_service": "/api/v1/service/lb-uuid/", "to_service": "/api/v1/service/uuid-1/", "name": "WEB_1"},
                    {"from_service": "/api/v1/service/lb-uuid/", "to_service": "/api/v1/service/uuid-2/", "name": "WEB_2"}
                ]
            }),
        )
        .service(
            "uuid-1",
            json!({"public_dns": "staging-web.yniche-other.yniche.svc.tutum.io"}),
        )
        .service(
            "uuid-2",
            json!({"public_dns": "staging-api.yniche-linkedin-auth.yniche.svc.tutum.io"}),
        )
}

#[test]
fn link_strips_service_prefix() {
    let link = ServiceLink::new("staging-web", "yniche-a", "staging-");
    assert_eq!(link.alias, "web-yniche-a");
    assert_eq!(link.to_string(), "staging-web.yniche-a:web-yniche-a");
}

#[test]
fn link_without_prefix_keeps_name() {
    let link = ServiceLink::new("redis", "yniche-a", "staging-");
    assert_eq!(link.to_string(), "redis.yniche-a:redis-yniche-a");
}

#[test]
fn link_from_public_dns() {
    let link =
        ServiceLink::from_public_dns("staging-web.yniche-a.yniche.svc.tutum.io", "staging-").unwrap();
    assert_eq!(link.service, "staging-web");
    assert_eq!(link.stack, "yniche-a");

    assert!(ServiceLink::from_public_dns("standalone", "staging-").is_none());
    assert!(ServiceLink::from_public_dns("", "staging-").is_none());
}

#[test]
fn merge_dedups_preserving_order() {
    let merged = links::merge_links(["A", "B", "A"].map(String::from));
    assert_eq!(merged, vec!["A", "B"]);
}

#[test]
fn derived_links_follow_locked_tags() {
    let mut vars = VariableStore::new(Resolution::LockedTagFallback).with_env(|_| None);
    vars.set("BRANCH", "x");
    vars.resolve("LOCKED_API_TAG").unwrap();
    vars.resolve("LOCKED_AUTH_WORKER_TAG").unwrap();

    assert_eq!(
        links::derived_links(&vars, "yniche-a", "staging-"),
        vec![
            "staging-api.yniche-a:api-yniche-a",
            "staging-auth-worker.yniche-a:auth-worker-yniche-a",
        ]
    );
}

#[test]
fn discovers_existing_links() {
    let platform = platform_with_links();
    let linker = Linker::new(&platform, "staging-");

    assert_eq!(
        linker.existing_links(LB),
        vec![
            "staging-web.yniche-other:web-yniche-other",
            "staging-api.yniche-linkedin-auth:api-yniche-linkedin-auth",
        ]
    );
}

#[test]
fn compute_merges_existing_derived_and_deployed() {
    let platform = platform_with_links();
    let linker = Linker::new(&platform, "staging-");
    let mut vars = VariableStore::new(Resolution::LockedTagFallback).with_env(|_| None);
    vars.resolve("LOCKED_API_TAG").unwrap();
    let deployed = ServiceLink::new("staging-web", "yniche-linkedin-auth", "staging-");

    let computed = linker.compute_links(LB, &vars, &deployed);

    assert_eq!(
        computed,
        vec![
            "staging-web.yniche-other:web-yniche-other",
            "staging-api.yniche-linkedin-auth:api-yniche-linkedin-auth",
            "staging-web.yniche-linkedin-auth:web-yniche-linkedin-auth",
        ]
    );
}

#[test]
fn unreachable_load_balancer_yields_no_existing_links() {
    let platform = FakePlatform::new().fail_on("service inspect");
    let linker = Linker::new(&platform, "staging-");
    let vars = VariableStore::new(Resolution::Strict);
    let deployed = ServiceLink::new("staging-web", "yniche-a", "staging-");

    assert!(linker.existing_links(LB).is_empty());
    assert_eq!(
        linker.compute_links(LB, &vars, &deployed),
        vec!["staging-web.yniche-a:web-yniche-a"]
    );
}

#[test]
fn malformed_service_json_yields_no_existing_links() {
    let platform = FakePlatform::new()
        .service(LB, json!({"linked_to_service": [{"to_service": "/api/v1/service/uuid-1/"}]}))
        .service("uuid-1", json!({"public_dns": 42}));
    let linker = Linker::new(&platform, "staging-");

    assert!(linker.existing_links(LB).is_empty());
}

#[test]
fn links_value_is_flow_sequence() {
    let value = links::links_value(&["a.b:c".to_string(), "d.e:f".to_string()]).unwrap();
    assert_eq!(value, r#"["a.b:c","d.e:f"]"#);
    assert_eq!(links::links_value(&[]).unwrap(), "[]");
}
