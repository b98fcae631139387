//! Diff/patch round-trip workflows over realistic specification documents.

use serde_json::{json, Value};
use specledger_diff::{diff, patch, unpatch, Delta, DeltaOp};

fn petstore() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Petstore",
            "version": "1.0.0",
            "description": "A sample API that uses a petstore as an example to demonstrate features in the OpenAPI 3.0 specification."
        },
        "paths": {
            "/pets": {
                "get": {
                    "summary": "List all pets",
                    "parameters": [
                        {"name": "limit", "in": "query", "required": false},
                        {"name": "offset", "in": "query", "required": false}
                    ],
                    "responses": {"200": {"description": "A paged array of pets"}}
                },
                "post": {
                    "summary": "Create a pet",
                    "responses": {"201": {"description": "Null response"}}
                }
            }
        },
        "tags": ["pets", "store", "user"]
    })
}

fn check(old: &Value, new: &Value) -> Delta {
    let delta = diff(old, new).expect("documents differ");
    assert_eq!(&patch(old, &delta).unwrap(), new, "patch must produce the new state");
    assert_eq!(&unpatch(new, &delta).unwrap(), old, "unpatch must recover the old state");
    delta
}

#[test]
fn identical_documents_produce_no_delta() {
    let doc = petstore();
    assert!(diff(&doc, &doc).is_none());
}

#[test]
fn key_addition_and_removal() {
    let old = petstore();
    let mut new = old.clone();
    new["paths"]["/pets"]["delete"] = json!({"summary": "Delete all pets"});
    new["info"]
        .as_object_mut()
        .unwrap()
        .remove("description");
    check(&old, &new);
}

#[test]
fn deep_scalar_edit_has_narrow_path() {
    let old = petstore();
    let mut new = old.clone();
    new["paths"]["/pets"]["get"]["parameters"][0]["required"] = json!(true);
    let delta = check(&old, &new);
    assert_eq!(delta.len(), 1);
    let DeltaOp::Replace { path, .. } = &delta.0[0] else {
        panic!("expected a single replace, got {delta:?}");
    };
    assert_eq!(
        path,
        &["paths", "/pets", "get", "parameters", "0", "required"]
            .map(String::from)
            .to_vec()
    );
}

#[test]
fn long_description_uses_text_patch() {
    let old = petstore();
    let mut new = old.clone();
    new["info"]["description"] = json!(
        "A sample API that uses a petstore as a worked example to demonstrate features in the OpenAPI 3.0 specification."
    );
    let delta = check(&old, &new);
    assert!(
        delta.0.iter().any(|op| matches!(op, DeltaOp::Edit { .. })),
        "long prose edits should be text patches, got {delta:?}"
    );
}

#[test]
fn reordered_tags_move_without_duplication() {
    let old = petstore();
    let mut new = old.clone();
    new["tags"] = json!(["user", "pets", "store"]);
    let delta = check(&old, &new);
    assert!(delta.0.iter().any(|op| matches!(op, DeltaOp::Move { .. })));
    assert!(
        !delta.0.iter().any(|op| matches!(op, DeltaOp::Add { .. })),
        "moved elements must not be re-added by value: {delta:?}"
    );
}

#[test]
fn parameter_list_churn() {
    let old = petstore();
    let mut new = old.clone();
    new["paths"]["/pets"]["get"]["parameters"] = json!([
        {"name": "offset", "in": "query", "required": false},
        {"name": "limit", "in": "query", "required": true},
        {"name": "sort", "in": "query", "required": false}
    ]);
    check(&old, &new);
}

#[test]
fn delta_survives_serialization() {
    let old = petstore();
    let mut new = old.clone();
    new["tags"] = json!(["store", "pets"]);
    new["openapi"] = json!("3.1.0");
    let delta = check(&old, &new);

    let wire = serde_json::to_vec(&delta).unwrap();
    let revived: Delta = serde_json::from_slice(&wire).unwrap();
    assert_eq!(patch(&old, &revived).unwrap(), new);
}

#[test]
fn successive_deltas_chain() {
    let v1 = petstore();
    let mut v2 = v1.clone();
    v2["info"]["version"] = json!("1.1.0");
    v2["paths"]["/pets"]["get"]["summary"] = json!("List pets");
    let mut v3 = v2.clone();
    v3["tags"] = json!(["pets", "user", "store", "admin"]);

    let d12 = diff(&v1, &v2).unwrap();
    let d23 = diff(&v2, &v3).unwrap();

    let replayed = patch(&patch(&v1, &d12).unwrap(), &d23).unwrap();
    assert_eq!(replayed, v3);

    let rewound = unpatch(&unpatch(&v3, &d23).unwrap(), &d12).unwrap();
    assert_eq!(rewound, v1);
}

#[test]
fn root_type_change() {
    check(&json!({"a": 1}), &json!([1, 2, 3]));
    check(&json!("scalar"), &json!({"now": "object"}));
}

#[test]
fn empty_delta_is_never_produced() {
    assert!(diff(&json!({}), &json!({})).is_none());
    assert!(diff(&json!([]), &json!([])).is_none());
}
