//! Bundling: rewriting a multi-document graph into one self-contained
//! document.
//!
//! Every external target is inlined exactly once, at the first site that
//! references it in discovery order. The target's local path is registered
//! *before* its subtree is transformed, so any later reference (including
//! one from inside the subtree itself) rewrites to a local pointer instead
//! of inlining a second copy. Internal references rewrite to their target's
//! local path; cycles always become local pointers, which also makes the
//! pass idempotent on an already bundled document.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use refpack_core::{Error, Location, Refs, pointer};
use refpack_resolve::{Aggregator, CycleTracker, Options, Resolution, ref_target, resolve_ref};

/// Bundle the document graph rooted at `entry` into a single value.
///
/// Cycle metadata found along the way is applied to the registry even when
/// the call itself fails.
pub fn bundle(
    refs: &mut Refs,
    entry: &Location,
    opts: &Options,
    agg: &mut Aggregator,
) -> Result<Value, Error> {
    let mut tracker = CycleTracker::new();
    let result = {
        let bundler = Bundler {
            refs,
            entry,
            opts,
            tracker: &mut tracker,
            agg,
            inlined: HashMap::new(),
            in_flight: Vec::new(),
        };
        bundler.run()
    };
    tracker.apply(refs);
    result
}

struct Bundler<'a> {
    refs: &'a Refs,
    entry: &'a Location,
    opts: &'a Options,
    tracker: &'a mut CycleTracker,
    agg: &'a mut Aggregator,
    /// Canonical target key → local `/a/b` path it was inlined at.
    inlined: HashMap<String, String>,
    /// Target keys whose subtrees are currently being inlined. A hit here
    /// means a reference back into an ancestor, a structural cycle.
    in_flight: Vec<String>,
}

impl<'a> Bundler<'a> {
    fn run(mut self) -> Result<Value, Error> {
        let root_entry = self.refs.get(self.entry).ok_or_else(|| Error::Reader {
            location: self.entry.key(),
            reason: "document is not loaded".to_string(),
        })?;
        let location = root_entry.location.clone();
        self.transform(&location, String::new(), &root_entry.value)
    }

    fn transform(
        &mut self,
        location: &Location,
        out_path: String,
        value: &'a Value,
    ) -> Result<Value, Error> {
        if let Some(r) = ref_target(value) {
            let r = r.to_string();
            return self.transform_ref(location, &out_path, &r, value);
        }
        match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let child_path = format!("{out_path}/{idx}");
                    out.push(self.transform(location, child_path, item)?);
                }
                Ok(Value::Array(out))
            }
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (k, v) in map {
                    let child_path = pointer::join(&out_path, k);
                    out.insert(k.clone(), self.transform(location, child_path, v)?);
                }
                Ok(Value::Object(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn transform_ref(
        &mut self,
        location: &Location,
        out_path: &str,
        ref_str: &str,
        original: &Value,
    ) -> Result<Value, Error> {
        if !self.opts.resolve_external && is_external(location, ref_str) {
            // External discovery was skipped; leave the pointer as-is.
            return Ok(original.clone());
        }

        let resolution = match resolve_ref(self.refs, location, ref_str, self.tracker) {
            Ok(resolution) => resolution,
            Err(error) => {
                self.agg
                    .handle(error, location.key(), pointer::path_tokens(out_path))?;
                return Ok(Value::Null);
            }
        };

        match resolution {
            Resolution::Circular {
                location: target_loc,
                path,
            } => {
                // The closing edge of a cycle always becomes a local
                // pointer; the target was (or is being) inlined upstream.
                let key = format!("{}#{}", target_loc.key(), path);
                if target_loc == *self.entry {
                    return Ok(ref_value(&hash_path(&path)));
                }
                if let Some(local) = self.inlined.get(&key).cloned() {
                    return Ok(ref_value(&hash_path(&local)));
                }
                // A pure pointer chain closed on a target nothing has
                // inlined yet. This site becomes the cycle's local anchor
                // so the output stays self-contained.
                self.inlined.insert(key, out_path.to_string());
                Ok(ref_value(&hash_path(out_path)))
            }
            Resolution::Resolved(target) => {
                if target.location == *self.entry {
                    return Ok(ref_value(&hash_path(&target.path)));
                }
                let key = target.key();
                if let Some(local) = self.inlined.get(&key).cloned() {
                    if self.in_flight.iter().any(|k| *k == key) {
                        self.tracker.record(&target.location, key);
                    }
                    return Ok(ref_value(&hash_path(&local)));
                }
                tracing::debug!(target = %key, at = out_path, "inlining external target");
                // Register before recursing so self-references inside the
                // subtree rewrite locally instead of re-inlining.
                self.inlined.insert(key.clone(), out_path.to_string());
                let target_loc = target.location.clone();
                self.in_flight.push(key);
                let result = self.transform(&target_loc, out_path.to_string(), target.value);
                self.in_flight.pop();
                result
            }
        }
    }
}

fn ref_value(fragment: &str) -> Value {
    json!({ "$ref": fragment })
}

/// `/a/b` → `#/a/b`, `""` → `#`.
fn hash_path(path: &str) -> String {
    format!("#{path}")
}

/// Does this reference leave the document it appears in?
fn is_external(location: &Location, ref_str: &str) -> bool {
    let (loc_part, _fragment) = refpack_core::location::split_fragment(ref_str);
    if loc_part.is_empty() {
        return false;
    }
    match location.resolve_relative(ref_str) {
        Ok(target) => target != *location,
        Err(_) => true,
    }
}
