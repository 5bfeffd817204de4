use std::path::PathBuf;

use refpack_core::Location;
use refpack_core::location::split_fragment;

#[test]
fn absolute_path_ignores_base() {
    let base = Location::File(PathBuf::from("/docs/root.json"));
    let loc = Location::canonicalize("/other/spec.yaml", Some(&base)).unwrap();
    assert_eq!(loc.key(), "/other/spec.yaml");
}

#[test]
fn relative_path_resolves_against_base_directory() {
    let base = Location::File(PathBuf::from("/docs/api/root.json"));
    let loc = Location::canonicalize("schemas/pet.json", Some(&base)).unwrap();
    assert_eq!(loc.key(), "/docs/api/schemas/pet.json");
}

#[test]
fn dot_segments_are_normalized() {
    let base = Location::File(PathBuf::from("/docs/api/root.json"));
    let loc = Location::canonicalize("../shared/./defs.json", Some(&base)).unwrap();
    assert_eq!(loc.key(), "/docs/shared/defs.json");
}

#[test]
fn memory_base_anchors_relative_paths() {
    let base = Location::Memory(PathBuf::from("/work"));
    let loc = Location::canonicalize("defs.json", Some(&base)).unwrap();
    assert_eq!(loc.key(), "/work/defs.json");
}

#[test]
fn url_replaces_file_base() {
    let base = Location::File(PathBuf::from("/docs/root.json"));
    let loc = Location::canonicalize("https://example.com/defs.json", Some(&base)).unwrap();
    assert_eq!(loc.key(), "https://example.com/defs.json");
}

#[test]
fn relative_reference_against_url_base_stays_in_url_space() {
    let base = Location::canonicalize("https://example.com/api/root.json", None).unwrap();
    let loc = Location::canonicalize("../shared/defs.json", Some(&base)).unwrap();
    assert_eq!(loc.key(), "https://example.com/shared/defs.json");
}

#[test]
fn file_url_becomes_a_file_location() {
    let loc = Location::canonicalize("file:///docs/root.json", None).unwrap();
    assert_eq!(loc, Location::File(PathBuf::from("/docs/root.json")));
}

#[test]
fn resolve_relative_strips_the_fragment() {
    let base = Location::File(PathBuf::from("/docs/root.json"));
    let loc = base.resolve_relative("defs.json#/a/b").unwrap();
    assert_eq!(loc.key(), "/docs/defs.json");
}

#[test]
fn fragment_only_reference_resolves_to_self() {
    let base = Location::File(PathBuf::from("/docs/root.json"));
    let loc = base.resolve_relative("#/a/b").unwrap();
    assert_eq!(loc, base);
}

#[test]
fn split_fragment_cases() {
    assert_eq!(split_fragment("b.json#/x"), ("b.json", "#/x"));
    assert_eq!(split_fragment("#/x"), ("", "#/x"));
    assert_eq!(split_fragment("b.json"), ("b.json", ""));
    assert_eq!(split_fragment("b.json#"), ("b.json", "#"));
}

#[test]
fn equal_keys_mean_equal_locations() {
    let a = Location::canonicalize("/docs/a/../root.json", None).unwrap();
    let b = Location::canonicalize("/docs/root.json", None).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.key(), b.key());
}
