//! Turning a location into a registry entry.
//!
//! Reader selection, then parser selection, then entry construction. The
//! exact-once guarantee lives in [`load`]: a location already present in
//! the registry is never fetched again.

use refpack_core::{Error, Location, RefEntry, Refs};
use refpack_plugins::{FileInfo, SelectionError};

use crate::options::Options;

/// Fetch and decode one document without touching the registry.
///
/// Kept registry-free so sibling discoveries can run concurrently; the
/// caller inserts results in discovery order.
pub async fn fetch(location: &Location, opts: &Options) -> Result<RefEntry, Error> {
    let (data, reader) = opts.readers.read(location).await.map_err(|e| match e {
        SelectionError::Unmatched => Error::UnmatchedReader {
            location: location.key(),
        },
        SelectionError::AllFailed { error, .. } => Error::Reader {
            location: location.key(),
            reason: error.to_string(),
        },
    })?;

    let file = FileInfo {
        location: location.clone(),
        data,
    };
    let (value, parser) = opts.parsers.parse(&file).await.map_err(|e| match e {
        SelectionError::Unmatched => Error::UnmatchedParser {
            location: location.key(),
        },
        SelectionError::AllFailed { error, .. } => Error::Parser {
            location: location.key(),
            reason: error.to_string(),
        },
    })?;

    tracing::debug!(location = %location, reader, parser, "loaded document");
    Ok(RefEntry {
        location: location.clone(),
        value,
        raw: file.data,
        circular: false,
        reader: Some(reader),
        parser: Some(parser),
    })
}

/// Load a location into the registry, exactly once per run.
pub async fn load(refs: &mut Refs, location: &Location, opts: &Options) -> Result<(), Error> {
    if refs.contains(location) {
        return Ok(());
    }
    let entry = fetch(location, opts).await?;
    refs.insert(entry);
    Ok(())
}
