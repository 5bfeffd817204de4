use serde_json::{Value, json};

use refpack_core::{Error, Location, RefEntry, Refs};
use refpack_resolve::{CycleTracker, Resolution, ref_target, resolve_ref};

fn entry(location: Location, value: Value) -> RefEntry {
    RefEntry {
        location,
        raw: value.to_string().into_bytes(),
        value,
        circular: false,
        reader: None,
        parser: None,
    }
}

fn registry(docs: &[(&str, Value)]) -> Refs {
    let mut refs = Refs::new();
    for (path, value) in docs {
        refs.insert(entry(Location::File(path.into()), value.clone()));
    }
    refs
}

fn root() -> Location {
    Location::File("/docs/root.json".into())
}

fn resolved<'a>(resolution: Resolution<'a>) -> refpack_resolve::Target<'a> {
    match resolution {
        Resolution::Resolved(target) => target,
        Resolution::Circular { location, path } => {
            panic!("unexpected cycle at {location}#{path}")
        }
    }
}

#[test]
fn ref_target_only_accepts_string_refs() {
    assert_eq!(ref_target(&json!({"$ref": "#/a"})), Some("#/a"));
    assert_eq!(ref_target(&json!({"$ref": 7})), None);
    assert_eq!(ref_target(&json!({"other": "#/a"})), None);
    assert_eq!(ref_target(&json!("#/a")), None);
}

#[test]
fn internal_pointer_resolves_within_the_document() {
    let refs = registry(&[(
        "/docs/root.json",
        json!({"definitions": {"pet": {"name": "Fido"}}}),
    )]);
    let mut tracker = CycleTracker::new();

    let target = resolved(resolve_ref(&refs, &root(), "#/definitions/pet", &mut tracker).unwrap());
    assert_eq!(*target.value, json!({"name": "Fido"}));
    assert_eq!(target.path, "/definitions/pet");
    assert_eq!(target.location, root());
}

#[test]
fn external_pointer_resolves_in_the_referenced_document() {
    let refs = registry(&[
        ("/docs/root.json", json!({"pet": {"$ref": "defs.json#/pet"}})),
        ("/docs/defs.json", json!({"pet": {"name": "Rex"}})),
    ]);
    let mut tracker = CycleTracker::new();

    let target = resolved(resolve_ref(&refs, &root(), "defs.json#/pet", &mut tracker).unwrap());
    assert_eq!(*target.value, json!({"name": "Rex"}));
    assert_eq!(target.location, Location::File("/docs/defs.json".into()));
}

#[test]
fn chained_refs_resolve_to_the_final_target() {
    let refs = registry(&[(
        "/docs/root.json",
        json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/c"},
            "c": 42
        }),
    )]);
    let mut tracker = CycleTracker::new();

    let target = resolved(resolve_ref(&refs, &root(), "#/a", &mut tracker).unwrap());
    assert_eq!(*target.value, json!(42));
    assert_eq!(target.path, "/c");
}

#[test]
fn refs_in_the_middle_of_a_pointer_are_chased() {
    let refs = registry(&[
        (
            "/docs/root.json",
            json!({"indirect": {"$ref": "defs.json"}}),
        ),
        ("/docs/defs.json", json!({"pet": {"name": "Rex"}})),
    ]);
    let mut tracker = CycleTracker::new();

    let target =
        resolved(resolve_ref(&refs, &root(), "#/indirect/pet/name", &mut tracker).unwrap());
    assert_eq!(*target.value, json!("Rex"));
    assert_eq!(target.location, Location::File("/docs/defs.json".into()));
    assert_eq!(target.path, "/pet/name");
}

#[test]
fn escaped_tokens_resolve() {
    let refs = registry(&[(
        "/docs/root.json",
        json!({"paths": {"/pets": {"get": "ok"}}}),
    )]);
    let mut tracker = CycleTracker::new();

    let target = resolved(resolve_ref(&refs, &root(), "#/paths/~1pets/get", &mut tracker).unwrap());
    assert_eq!(*target.value, json!("ok"));
}

#[test]
fn array_indices_are_pointer_tokens() {
    let refs = registry(&[("/docs/root.json", json!({"items": ["a", "b"]}))]);
    let mut tracker = CycleTracker::new();

    let target = resolved(resolve_ref(&refs, &root(), "#/items/1", &mut tracker).unwrap());
    assert_eq!(*target.value, json!("b"));
}

#[test]
fn missing_token_reports_the_exact_token() {
    let refs = registry(&[("/docs/root.json", json!({"foo": {"$ref": "#/baz"}}))]);
    let mut tracker = CycleTracker::new();

    let err = resolve_ref(&refs, &root(), "#/baz", &mut tracker).unwrap_err();
    assert_eq!(err.to_string(), "Token \"baz\" does not exist.");
}

#[test]
fn pointer_without_leading_slash_is_invalid() {
    let refs = registry(&[("/docs/root.json", json!({}))]);
    let mut tracker = CycleTracker::new();

    let err = resolve_ref(&refs, &root(), "#foo", &mut tracker).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid $ref pointer \"#foo\". Pointers must begin with \"#/\""
    );
}

#[test]
fn unloaded_document_is_an_error() {
    let refs = registry(&[("/docs/root.json", json!({}))]);
    let mut tracker = CycleTracker::new();

    let err = resolve_ref(&refs, &root(), "missing.json#/x", &mut tracker).unwrap_err();
    assert!(matches!(err, Error::Reader { .. }));
}

#[test]
fn pointer_chain_cycles_come_back_as_circular() {
    let refs = registry(&[(
        "/docs/root.json",
        json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/a"}
        }),
    )]);
    let mut tracker = CycleTracker::new();

    let resolution = resolve_ref(&refs, &root(), "#/a", &mut tracker).unwrap();
    assert!(matches!(resolution, Resolution::Circular { .. }));
    assert!(tracker.has_cycles());
}

#[test]
fn cycle_metadata_lands_on_the_registry_via_apply() {
    let mut refs = registry(&[("/docs/root.json", json!({"a": {"$ref": "#/a"}}))]);
    let mut tracker = CycleTracker::new();

    let resolution = resolve_ref(&refs, &root(), "#/a", &mut tracker).unwrap();
    assert!(matches!(resolution, Resolution::Circular { .. }));

    tracker.apply(&mut refs);
    assert!(refs.circular);
    assert!(refs.get(&root()).unwrap().circular);
    assert_eq!(refs.circular_refs, ["/docs/root.json#/a"]);
}
