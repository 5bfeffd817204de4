//! External reference discovery.
//!
//! Walks each loaded document for `$ref` strings pointing outside it,
//! fetches newly discovered sibling documents concurrently, and recurses
//! until the transitively reachable set is loaded. Discovery order is
//! recorded at collection time, and registry insertion follows it rather
//! than fetch completion order, so enumeration stays deterministic for a
//! given graph.

use futures::future::{BoxFuture, join_all};
use indexmap::IndexMap;
use serde_json::Value;

use refpack_core::location::split_fragment;
use refpack_core::{Error, Location, Refs};

use crate::aggregate::Aggregator;
use crate::loader;
use crate::options::Options;
use crate::resolver::ref_target;

/// One `$ref` occurrence: its path within the owning document (unescaped
/// tokens) and the raw reference string.
#[derive(Debug, Clone, PartialEq)]
pub struct RefSite {
    pub path: Vec<String>,
    pub target: String,
}

/// Collect every `$ref` site in a document, depth-first, insertion order.
pub fn collect_ref_sites(value: &Value) -> Vec<RefSite> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(value, &mut path, &mut out);
    out
}

fn walk(value: &Value, path: &mut Vec<String>, out: &mut Vec<RefSite>) {
    if let Some(target) = ref_target(value) {
        out.push(RefSite {
            path: path.clone(),
            target: target.to_string(),
        });
        // Sibling keys of a $ref are still crawled; the $ref string itself
        // is not a subtree.
        if let Value::Object(map) = value {
            for (key, child) in map {
                if key != "$ref" {
                    path.push(key.clone());
                    walk(child, path, out);
                    path.pop();
                }
            }
        }
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                path.push(idx.to_string());
                walk(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Load every document transitively reachable from `root` via external
/// `$ref`s. No-op when external resolution is disabled.
pub async fn resolve_external(
    refs: &mut Refs,
    root: &Location,
    opts: &Options,
    agg: &mut Aggregator,
) -> Result<(), Error> {
    if !opts.resolve_external {
        return Ok(());
    }
    crawl_document(refs, root.clone(), opts, agg).await
}

fn crawl_document<'a>(
    refs: &'a mut Refs,
    location: Location,
    opts: &'a Options,
    agg: &'a mut Aggregator,
) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        let sites = match refs.get(&location) {
            Some(entry) => collect_ref_sites(&entry.value),
            None => return Ok(()),
        };

        // Distinct new targets, in discovery order, each with every site
        // that references it (concurrent duplicates coalesce here).
        let mut targets: IndexMap<String, (Location, Vec<RefSite>)> = IndexMap::new();
        for site in sites {
            let (loc_part, _fragment) = split_fragment(&site.target);
            if loc_part.is_empty() {
                continue;
            }
            let target = match location.resolve_relative(&site.target) {
                Ok(target) => target,
                Err(error) => {
                    agg.handle(error, location.key(), site.path.clone())?;
                    null_patch(refs, &location, &site.path);
                    continue;
                }
            };
            if target == location || refs.contains(&target) {
                continue;
            }
            targets
                .entry(target.key())
                .or_insert_with(|| (target, Vec::new()))
                .1
                .push(site);
        }
        if targets.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            from = %location,
            count = targets.len(),
            "fetching externally referenced documents"
        );
        let fetches = targets.values().map(|(target, _)| loader::fetch(target, opts));
        let results = join_all(fetches).await;

        let mut loaded = Vec::new();
        for ((target, sites), result) in targets.into_values().zip(results) {
            match result {
                Ok(entry) => {
                    refs.insert(entry);
                    loaded.push(target);
                }
                Err(error) => {
                    let path = sites.first().map(|s| s.path.clone()).unwrap_or_default();
                    agg.handle(error, location.key(), path)?;
                    for site in &sites {
                        null_patch(refs, &location, &site.path);
                    }
                }
            }
        }

        for target in loaded {
            crawl_document(refs, target, opts, agg).await?;
        }
        Ok(())
    })
}

/// Replace a failed `$ref` site with `null` so the walk can continue past
/// it in continue-on-error mode.
fn null_patch(refs: &mut Refs, location: &Location, path: &[String]) {
    if let Some(entry) = refs.get_mut(location) {
        if let Some(node) = value_at_mut(&mut entry.value, path) {
            *node = Value::Null;
        }
    }
}

fn value_at_mut<'a>(value: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut cur = value;
    for token in path {
        cur = match cur {
            Value::Object(map) => map.get_mut(token)?,
            Value::Array(items) => items.get_mut(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}
