//! Tests for the one-shot `plan` command

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use stubwatch::{plan_batch, Config};
use stubwatch_core::ChangeBatch;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
    "constants": ["User", "Order", "ApplicationMailer"],
    "definitions": {
        "User": { "categories": ["persistence_model"] },
        "Order": { "categories": ["persistence_model"] },
        "ApplicationMailer": {}
    },
    "generators": [
        "Tapioca::Dsl::Compilers::ActiveRecordColumns",
        "Tapioca::Dsl::Compilers::ActionMailer"
    ]
}"#;

fn app_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("tmp/stubwatch/registry.json");
    std::fs::create_dir_all(registry.parent().unwrap()).unwrap();
    std::fs::write(registry, REGISTRY).unwrap();
    dir
}

#[tokio::test]
async fn schema_change_reports_entity_plan() {
    let root = app_root();
    let batch = ChangeBatch::modified(["db/schema.rb"]);

    let report = plan_batch(root.path(), &Config::default(), &batch)
        .await
        .unwrap();

    assert!(report.relevant);
    let plan = report.plan.unwrap();
    assert_eq!(
        plan.requested_entities(),
        &["User".to_string(), "Order".to_string()]
    );
    assert_eq!(plan.selected_generators().len(), 1);
    assert_eq!(report.summary.len(), 2);
}

#[tokio::test]
async fn irrelevant_batch_needs_no_registry() {
    // No registry on disk: an irrelevant batch must not reload the host
    let root = TempDir::new().unwrap();
    let batch = ChangeBatch::new(
        vec![PathBuf::from("sorbet/rbi/dsl/user.rbi")],
        vec![PathBuf::from("README.md")],
        vec![],
    );

    let report = plan_batch(root.path(), &Config::default(), &batch)
        .await
        .unwrap();

    assert!(!report.relevant);
    assert!(report.relevant_paths.is_empty());
    assert!(report.plan.is_none());
}

#[tokio::test]
async fn missing_registry_is_an_error() {
    let root = TempDir::new().unwrap();
    let batch = ChangeBatch::modified(["app/models/user.rb"]);

    let err = plan_batch(root.path(), &Config::default(), &batch)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("reload host application"));
}

#[tokio::test]
async fn report_serializes_to_json() {
    let root = app_root();
    let batch = ChangeBatch::new(
        vec![PathBuf::from("app/models/user.rb")],
        vec![],
        vec![PathBuf::from("app/models/legacy.rb")],
    );

    let report = plan_batch(root.path(), &Config::default(), &batch)
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["relevant"], serde_json::json!(true));
    assert_eq!(
        json["plan"]["requested_paths"],
        serde_json::json!(["app/models/user.rb", "app/models/legacy.rb"])
    );
    assert_eq!(json["plan"]["requested_entities"], serde_json::json!([]));
    assert_eq!(
        json["plan"]["selected_generators"],
        serde_json::json!([
            "Tapioca::Dsl::Compilers::ActiveRecordColumns",
            "Tapioca::Dsl::Compilers::ActionMailer"
        ])
    );
}
