//! Pointer resolution against a populated registry.
//!
//! Resolution is pure computation: every reachable document is loaded
//! before this runs, so walking never suspends. Chained `$ref`s are
//! followed; a per-call in-progress set of canonical `location#/path`
//! targets catches pointer-chain cycles and reports them as
//! [`Resolution::Circular`] instead of recursing forever.

use serde_json::Value;

use refpack_core::location::split_fragment;
use refpack_core::{Error, Location, Pointer, Refs, pointer};

/// A fully resolved pointer target.
#[derive(Debug, Clone)]
pub struct Target<'a> {
    /// The document the target node lives in.
    pub location: Location,
    /// Slash-joined path of the node within that document (`""` = root).
    pub path: String,
    pub value: &'a Value,
}

impl Target<'_> {
    /// Canonical `location#/path` identity of this target.
    pub fn key(&self) -> String {
        format!("{}#{}", self.location.key(), self.path)
    }
}

#[derive(Debug)]
pub enum Resolution<'a> {
    Resolved(Target<'a>),
    /// The pointer closes a cycle; the tracker has already recorded it.
    Circular { location: Location, path: String },
}

/// Per-top-level-call cycle state: the in-progress resolution stack plus
/// every cycle edge found so far.
///
/// Found edges are applied to the registry by the caller once walking is
/// done (or failed); resolution itself only needs shared access.
#[derive(Debug, Default)]
pub struct CycleTracker {
    in_progress: Vec<String>,
    found: Vec<(Location, String)>,
}

impl CycleTracker {
    pub fn new() -> CycleTracker {
        CycleTracker::default()
    }

    fn entered(&self, id: &str) -> bool {
        self.in_progress.iter().any(|s| s == id)
    }

    /// Record one cycle edge, keyed by the closing pointer's canonical
    /// path; duplicates are kept once.
    pub fn record(&mut self, location: &Location, id: String) {
        if !self.found.iter().any(|(_, existing)| *existing == id) {
            self.found.push((location.clone(), id));
        }
    }

    pub fn has_cycles(&self) -> bool {
        !self.found.is_empty()
    }

    /// Flag every found cycle on the registry. Valid to call even when the
    /// surrounding operation failed.
    pub fn apply(&self, refs: &mut Refs) {
        for (location, id) in &self.found {
            refs.mark_circular(location, id.clone());
        }
    }
}

/// The `$ref` string of a pointer-marker node, if this node is one.
pub fn ref_target(value: &Value) -> Option<&str> {
    value.as_object()?.get("$ref")?.as_str()
}

/// Resolve a `$ref` string against the registry, from `base`.
pub fn resolve_ref<'a>(
    refs: &'a Refs,
    base: &Location,
    ref_str: &str,
    tracker: &mut CycleTracker,
) -> Result<Resolution<'a>, Error> {
    let (loc_part, fragment) = split_fragment(ref_str);
    let target_loc = if loc_part.is_empty() {
        base.clone()
    } else {
        base.resolve_relative(loc_part)?
    };
    let ptr = Pointer::parse(fragment).map_err(|_| Error::InvalidPointer {
        pointer: ref_str.to_string(),
    })?;

    let target_id = format!("{}#{}", target_loc.key(), ptr.path());
    if tracker.entered(&target_id) {
        tracker.record(&target_loc, target_id);
        return Ok(Resolution::Circular {
            location: target_loc,
            path: ptr.path(),
        });
    }

    tracker.in_progress.push(target_id);
    let result = walk(refs, &target_loc, &ptr, tracker);
    tracker.in_progress.pop();
    result
}

fn walk<'a>(
    refs: &'a Refs,
    location: &Location,
    ptr: &Pointer,
    tracker: &mut CycleTracker,
) -> Result<Resolution<'a>, Error> {
    let entry = refs.get(location).ok_or_else(|| Error::Reader {
        location: location.key(),
        reason: "document is not loaded".to_string(),
    })?;

    let mut cur_loc = location.clone();
    let mut cur_path = String::new();
    let mut cur = &entry.value;

    for token in ptr.tokens() {
        // Chase chained $refs before applying the next token.
        loop {
            match ref_target(cur) {
                Some(r) => match resolve_ref(refs, &cur_loc, r, tracker)? {
                    Resolution::Resolved(target) => {
                        cur = target.value;
                        cur_loc = target.location;
                        cur_path = target.path;
                    }
                    circular @ Resolution::Circular { .. } => return Ok(circular),
                },
                None => break,
            }
        }
        cur = step(cur, token)?;
        cur_path = pointer::join(&cur_path, token);
    }

    // The final node may itself be a chained $ref.
    loop {
        match ref_target(cur) {
            Some(r) => match resolve_ref(refs, &cur_loc, r, tracker)? {
                Resolution::Resolved(target) => {
                    cur = target.value;
                    cur_loc = target.location;
                    cur_path = target.path;
                }
                circular @ Resolution::Circular { .. } => return Ok(circular),
            },
            None => break,
        }
    }

    Ok(Resolution::Resolved(Target {
        location: cur_loc,
        path: cur_path,
        value: cur,
    }))
}

/// Apply one pointer token to a node.
fn step<'a>(value: &'a Value, token: &str) -> Result<&'a Value, Error> {
    let found = match value {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    };
    found.ok_or_else(|| Error::MissingPointer {
        token: token.to_string(),
    })
}
