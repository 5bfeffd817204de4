//! Dereferencing: building the identity-preserving value graph.
//!
//! The walk is depth-first in insertion order. Every node is keyed by its
//! canonical `location#/path` identity; a node is built at most once per
//! key, so two structurally distinct `$ref`s to the same target end up
//! holding the same [`NodeId`]. A placeholder id is allocated *before*
//! children are built and patched in place afterward; that ordering is
//! what lets a `$ref` back to an ancestor close into a real cycle instead
//! of recursing forever.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use refpack_core::{Error, Location, Node, NodeId, Refs, ValueGraph, pointer};
use refpack_resolve::{
    Aggregator, CircularPolicy, CycleTracker, Options, Resolution, ref_target, resolve_ref,
};

/// Dereference the document graph rooted at `entry` into an arena graph.
///
/// Cycle metadata found along the way is applied to the registry even when
/// the call itself fails (circular policy [`CircularPolicy::Forbid`]).
pub fn dereference(
    refs: &mut Refs,
    entry: &Location,
    opts: &Options,
    agg: &mut Aggregator,
) -> Result<ValueGraph, Error> {
    let mut tracker = CycleTracker::new();
    let result = {
        let builder = Builder {
            refs,
            opts,
            tracker: &mut tracker,
            agg,
            graph: ValueGraph::new(),
            built: HashMap::new(),
            pending: HashSet::new(),
        };
        builder.run(entry)
    };
    tracker.apply(refs);
    result
}

struct Builder<'a> {
    refs: &'a Refs,
    opts: &'a Options,
    tracker: &'a mut CycleTracker,
    agg: &'a mut Aggregator,
    graph: ValueGraph,
    /// Canonical `location#/path` → node id.
    built: HashMap<String, NodeId>,
    /// Ids whose children are still being built (cycle detection).
    pending: HashSet<NodeId>,
}

impl<'a> Builder<'a> {
    fn run(mut self, entry: &Location) -> Result<ValueGraph, Error> {
        let root_entry = self.refs.get(entry).ok_or_else(|| Error::Reader {
            location: entry.key(),
            reason: "document is not loaded".to_string(),
        })?;
        let root = self.build_node(&root_entry.location.clone(), String::new(), &root_entry.value)?;
        self.graph.set_root(root);
        Ok(self.graph)
    }

    fn build_node(
        &mut self,
        location: &Location,
        path: String,
        value: &'a Value,
    ) -> Result<NodeId, Error> {
        if let Some(r) = ref_target(value) {
            let r = r.to_string();
            return self.build_ref(location, &path, &r);
        }

        let key = format!("{}#{}", location.key(), path);
        if let Some(&id) = self.built.get(&key) {
            // Reached again through the natural walk after a $ref already
            // built it (or vice versa): share the node.
            return Ok(id);
        }

        let id = self.graph.alloc(Node::Null);
        self.built.insert(key, id);
        self.pending.insert(id);

        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => {
                let mut children = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let child_path = format!("{path}/{idx}");
                    children.push(self.build_node(location, child_path, item)?);
                }
                Node::Array(children)
            }
            Value::Object(map) => {
                let mut children = Vec::with_capacity(map.len());
                for (k, v) in map {
                    let child_path = pointer::join(&path, k);
                    children.push((k.clone(), self.build_node(location, child_path, v)?));
                }
                Node::Object(children)
            }
        };

        self.graph.replace(id, node);
        self.pending.remove(&id);
        Ok(id)
    }

    fn build_ref(
        &mut self,
        location: &Location,
        site_path: &str,
        ref_str: &str,
    ) -> Result<NodeId, Error> {
        if !self.opts.resolve_external && is_external(location, ref_str) {
            // External discovery was skipped; leave the pointer as-is.
            return Ok(self.graph.alloc(Node::Ref(ref_str.to_string())));
        }

        let resolution = match resolve_ref(self.refs, location, ref_str, self.tracker) {
            Ok(resolution) => resolution,
            Err(error) => {
                self.agg
                    .handle(error, location.key(), pointer::path_tokens(site_path))?;
                return Ok(self.graph.alloc(Node::Null));
            }
        };

        match resolution {
            Resolution::Circular {
                location: target_loc,
                path,
            } => {
                // A pointer-chain cycle; the tracker recorded it already.
                let key = format!("{}#{}", target_loc.key(), path);
                match self.opts.circular {
                    CircularPolicy::Forbid => Err(Error::CircularReference { pointer: key }),
                    CircularPolicy::Ignore => {
                        Ok(self.graph.alloc(Node::Ref(ref_str.to_string())))
                    }
                    CircularPolicy::Allow => match self.built.get(&key) {
                        Some(&id) => Ok(id),
                        // Degenerate chain (a $ref whose target is only ever
                        // $refs): nothing concrete to link to.
                        None => Ok(self.graph.alloc(Node::Ref(ref_str.to_string()))),
                    },
                }
            }
            Resolution::Resolved(target) => {
                let key = target.key();
                if let Some(&id) = self.built.get(&key) {
                    if self.pending.contains(&id) {
                        // $ref to an ancestor container still being built: a
                        // structural cycle.
                        self.tracker.record(&target.location, key.clone());
                        return match self.opts.circular {
                            CircularPolicy::Forbid => {
                                Err(Error::CircularReference { pointer: key })
                            }
                            CircularPolicy::Ignore => {
                                Ok(self.graph.alloc(Node::Ref(ref_str.to_string())))
                            }
                            CircularPolicy::Allow => Ok(id),
                        };
                    }
                    return Ok(id);
                }
                let target_loc = target.location.clone();
                let target_path = target.path.clone();
                self.build_node(&target_loc, target_path, target.value)
            }
        }
    }
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
