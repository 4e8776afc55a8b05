mod common;

use common::FakePlatform;
use serde_json::json;
use tutum_deploy::error::DeployError;
use tutum_deploy::platform;

const API_IMAGE: &str = "tutum.co/yniche/api.yniche.com";

fn image() -> serde_json::Value {
    json!({
        "name": API_IMAGE,
        "tags": [
            "/api/v1/image/tutum.co/yniche/api.yniche.com/tag/latest/",
            "/api/v1/image/tutum.co/yniche/api.yniche.com/tag/production/"
        ]
    })
}

#[test]
fn image_tags_use_last_segment() {
    assert_eq!(
        platform::image_tags(&image()).unwrap(),
        vec!["latest", "production"]
    );
}

#[test]
fn image_without_tags_has_none() {
    assert!(platform::image_tags(&json!({})).unwrap().is_empty());
}

#[test]
fn linked_service_ids_from_references() {
    let lb = json!({
        "linked_to_service": [
            {"to_service": "/api/v1/service/uuid-1/", "name": "WEB_1"},
            {"to_service": "/api/v1/service/uuid-2/", "name": "WEB_2"}
        ]
    });

    assert_eq!(
        platform::linked_service_ids(&lb).unwrap(),
        vec!["uuid-1", "uuid-2"]
    );
    assert!(platform::linked_service_ids(&json!({})).unwrap().is_empty());
}

#[test]
fn public_dns_required() {
    assert_eq!(
        platform::public_dns(&json!({"public_dns": "web.stack.svc.tutum.io"})).unwrap(),
        "web.stack.svc.tutum.io"
    );
    assert!(matches!(
        platform::public_dns(&json!({"public_dns": null})),
        Err(DeployError::Discovery(_))
    ));
}

#[test]
fn validate_tag_accepts_existing() {
    let fake = FakePlatform::new().image(API_IMAGE, image());
    platform::validate_tag(&fake, API_IMAGE, "production").unwrap();
}

#[test]
fn validate_tag_lists_available_tags() {
    let fake = FakePlatform::new().image(API_IMAGE, image());

    let err = platform::validate_tag(&fake, API_IMAGE, "v9").unwrap_err();
    match err {
        DeployError::UnknownTag { tag, available, .. } => {
            assert_eq!(tag, "v9");
            assert_eq!(available, vec!["latest", "production"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tutum_cli_defaults() {
    let cli = tutum_deploy::TutumCli::new();
    assert_eq!(cli.program, "tutum");
    assert_eq!(cli.program("/usr/local/bin/tutum").program, "/usr/local/bin/tutum");
}
