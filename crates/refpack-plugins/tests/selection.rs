use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use refpack_core::Location;
use refpack_plugins::{FileInfo, Matcher, Parser, ParserSet, PluginError, SelectionError};

/// A parser whose behavior is fixed at construction time.
struct FakeParser {
    name: &'static str,
    order: i32,
    matcher: Matcher,
    result: Result<Value, &'static str>,
}

#[async_trait]
impl Parser for FakeParser {
    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_parse(&self, file: &FileInfo) -> bool {
        self.matcher.matches(&file.url())
    }

    async fn parse(&self, _file: &FileInfo) -> Result<Value, PluginError> {
        self.result.clone().map_err(PluginError::failed)
    }
}

fn file(name: &str) -> FileInfo {
    FileInfo {
        location: Location::File(format!("/docs/{name}").into()),
        data: b"payload".to_vec(),
    }
}

fn fake(
    name: &'static str,
    order: i32,
    matcher: Matcher,
    result: Result<Value, &'static str>,
) -> Arc<FakeParser> {
    Arc::new(FakeParser {
        name,
        order,
        matcher,
        result,
    })
}

#[tokio::test]
async fn lowest_order_matching_plugin_wins() {
    let mut set = ParserSet::empty();
    set.register(fake("late", 200, Matcher::Always(true), Ok(json!("late"))));
    set.register(fake("early", 100, Matcher::Always(true), Ok(json!("early"))));

    let (value, name) = set.parse(&file("a.json")).await.unwrap();
    assert_eq!(value, json!("early"));
    assert_eq!(name, "early");
    assert_eq!(set.names(), ["early", "late"]);
}

#[tokio::test]
async fn equal_orders_keep_registration_order() {
    let mut set = ParserSet::empty();
    set.register(fake("first", 100, Matcher::Always(true), Ok(json!(1))));
    set.register(fake("second", 100, Matcher::Always(true), Ok(json!(2))));

    let (value, _) = set.parse(&file("a.json")).await.unwrap();
    assert_eq!(value, json!(1));
}

#[tokio::test]
async fn failure_falls_through_to_the_next_match_only() {
    let mut set = ParserSet::empty();
    set.register(fake("broken", 100, Matcher::Always(true), Err("boom")));
    // Matches nothing; must be skipped entirely, not "tried next".
    set.register(fake("picky", 150, Matcher::extensions([".xyz"]), Ok(json!("no"))));
    set.register(fake("fallback", 200, Matcher::Always(true), Ok(json!("yes"))));

    let (value, name) = set.parse(&file("a.json")).await.unwrap();
    assert_eq!(value, json!("yes"));
    assert_eq!(name, "fallback");
}

#[tokio::test]
async fn no_match_is_unmatched() {
    let mut set = ParserSet::empty();
    set.register(fake("picky", 100, Matcher::extensions([".xyz"]), Ok(json!(0))));

    let err = set.parse(&file("a.json")).await.unwrap_err();
    assert!(matches!(err, SelectionError::Unmatched));
}

#[tokio::test]
async fn every_match_failing_reports_the_last_failure() {
    let mut set = ParserSet::empty();
    set.register(fake("one", 100, Matcher::Always(true), Err("first boom")));
    set.register(fake("two", 200, Matcher::Always(true), Err("second boom")));

    let err = set.parse(&file("a.json")).await.unwrap_err();
    match err {
        SelectionError::AllFailed { plugin, error } => {
            assert_eq!(plugin, "two");
            assert_eq!(error.to_string(), "second boom");
        }
        other => panic!("expected AllFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn same_name_registration_replaces_in_place() {
    let mut set = ParserSet::empty();
    set.register(fake("json", 100, Matcher::Always(true), Ok(json!("old"))));
    set.register(fake("json", 100, Matcher::Always(true), Ok(json!("new"))));

    assert_eq!(set.names(), ["json"]);
    let (value, _) = set.parse(&file("a.json")).await.unwrap();
    assert_eq!(value, json!("new"));
}

#[tokio::test]
async fn remove_by_name() {
    let mut set = ParserSet::defaults();
    assert!(set.remove("binary"));
    assert!(!set.remove("binary"));
    assert_eq!(set.names(), ["json", "yaml", "text"]);
}
