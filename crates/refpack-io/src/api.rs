//! The four top-level operations.
//!
//! Every operation opens its source into a fresh registry, so concurrent
//! calls never share state. `parse` stops after the root document;
//! `resolve` crawls the whole external graph; `dereference` and `bundle`
//! crawl and then rewrite.

use serde_json::Value;

use refpack_core::{Error, Location, RefEntry, Refs, ValueGraph};
use refpack_resolve::{Aggregator, Options, crawl, loader};

/// What a top-level call starts from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A file path or URL, canonicalized against the working directory.
    Location(String),
    /// An already parsed in-memory root document.
    Value(Value),
}

impl From<&str> for Source {
    fn from(s: &str) -> Source {
        Source::Location(s.to_string())
    }
}

impl From<String> for Source {
    fn from(s: String) -> Source {
        Source::Location(s)
    }
}

impl From<&String> for Source {
    fn from(s: &String) -> Source {
        Source::Location(s.clone())
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Source {
        Source::Value(value)
    }
}

/// The result of [`dereference`]: the identity-preserving value graph plus
/// the registry it was built from.
#[derive(Debug)]
pub struct Dereferenced {
    pub graph: ValueGraph,
    pub refs: Refs,
}

impl Dereferenced {
    /// Materialize the graph back into a plain value. Fails if the graph
    /// contains a cycle, since a tree cannot represent one.
    pub fn to_value(&self) -> Result<Value, Error> {
        self.graph.to_value()
    }
}

/// The result of [`bundle`]: the self-contained document plus the registry
/// it was assembled from.
#[derive(Debug)]
pub struct Bundled {
    pub value: Value,
    pub refs: Refs,
}

/// Load the root document and return its parsed value. No external
/// references are followed.
pub async fn parse(source: impl Into<Source>, opts: &Options) -> Result<Value, Error> {
    let mut agg = Aggregator::new(opts.continue_on_error);
    let (refs, root) = open(source.into(), opts, &mut agg).await?;
    agg.finish(root.key(), &refs)?;
    let entry = refs.get(&root).ok_or_else(|| Error::Reader {
        location: root.key(),
        reason: "document is not loaded".to_string(),
    })?;
    Ok(entry.value.clone())
}

/// Load the root document plus everything transitively reachable from it,
/// and return the populated registry.
pub async fn resolve(source: impl Into<Source>, opts: &Options) -> Result<Refs, Error> {
    let mut agg = Aggregator::new(opts.continue_on_error);
    let (mut refs, root) = open(source.into(), opts, &mut agg).await?;
    crawl::resolve_external(&mut refs, &root, opts, &mut agg).await?;
    agg.finish(root.key(), &refs)?;
    Ok(refs)
}

/// Resolve the whole graph, then replace every `$ref` with a link to its
/// target node.
pub async fn dereference(source: impl Into<Source>, opts: &Options) -> Result<Dereferenced, Error> {
    let mut agg = Aggregator::new(opts.continue_on_error);
    let (mut refs, root) = open(source.into(), opts, &mut agg).await?;
    crawl::resolve_external(&mut refs, &root, opts, &mut agg).await?;
    if !refs.contains(&root) {
        // The root itself failed to load; raise what was recorded.
        agg.finish(root.key(), &refs)?;
    }
    let graph = refpack_bundle::dereference(&mut refs, &root, opts, &mut agg)?;
    agg.finish(root.key(), &refs)?;
    Ok(Dereferenced { graph, refs })
}

/// Resolve the whole graph, then rewrite it into one self-contained
/// document whose `$ref`s are all local.
pub async fn bundle(source: impl Into<Source>, opts: &Options) -> Result<Bundled, Error> {
    let mut agg = Aggregator::new(opts.continue_on_error);
    let (mut refs, root) = open(source.into(), opts, &mut agg).await?;
    crawl::resolve_external(&mut refs, &root, opts, &mut agg).await?;
    if !refs.contains(&root) {
        agg.finish(root.key(), &refs)?;
    }
    let value = refpack_bundle::bundle(&mut refs, &root, opts, &mut agg)?;
    agg.finish(root.key(), &refs)?;
    Ok(Bundled { value, refs })
}

/// Open a source into a fresh registry containing just its root entry.
///
/// A root load failure goes through the aggregator like any other loader
/// error, tagged with an empty in-document path. The registry then comes
/// back without a root entry and `finish` raises the group.
async fn open(
    source: Source,
    opts: &Options,
    agg: &mut Aggregator,
) -> Result<(Refs, Location), Error> {
    let mut refs = Refs::new();
    let root = match source {
        Source::Location(s) => {
            let location = Location::canonicalize(&s, None)?;
            if let Err(error) = loader::load(&mut refs, &location, opts).await {
                agg.handle(error, location.key(), Vec::new())?;
            }
            location
        }
        Source::Value(value) => {
            // Anchor the in-memory root at the working directory so
            // relative references inside it resolve against it.
            let dir = std::env::current_dir().map_err(|e| Error::InvalidLocation {
                location: "<memory>".to_string(),
                reason: e.to_string(),
            })?;
            let location = Location::Memory(dir);
            let raw = serde_json::to_vec(&value).map_err(|e| Error::Parser {
                location: location.key(),
                reason: e.to_string(),
            })?;
            refs.insert(RefEntry {
                location: location.clone(),
                value,
                raw,
                circular: false,
                reader: None,
                parser: None,
            });
            location
        }
    };
    tracing::debug!(root = %root, "opened source");
    Ok((refs, root))
}
