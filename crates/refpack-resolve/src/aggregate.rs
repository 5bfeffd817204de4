//! Error collection across one resolution run.
//!
//! Fail-fast mode hands every error straight back to the caller.
//! Continue-on-error mode turns each failure into exactly one record and
//! lets the walk carry on; `finish` raises the whole batch as a single
//! grouped error carrying the registry as it stood.

use refpack_core::{Error, ErrorGroup, ErrorRecord, Refs};

#[derive(Debug, Default)]
pub struct Aggregator {
    enabled: bool,
    records: Vec<ErrorRecord>,
}

impl Aggregator {
    pub fn new(enabled: bool) -> Aggregator {
        Aggregator {
            enabled,
            records: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Record the error (continue-on-error) or return it (fail-fast).
    ///
    /// `source` and `path` tag the failure with the document and
    /// in-document position it originated at.
    pub fn handle(&mut self, error: Error, source: String, path: Vec<String>) -> Result<(), Error> {
        if !self.enabled {
            return Err(error);
        }
        tracing::debug!(%error, source, "recording error; continuing");
        self.records.push(ErrorRecord::new(&error, Some(source), path));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Raise everything collected, or nothing if the run was clean.
    /// Draining, so a clean pass can keep using the aggregator.
    pub fn finish(&mut self, source: String, refs: &Refs) -> Result<(), Error> {
        if self.records.is_empty() {
            return Ok(());
        }
        Err(ErrorGroup {
            source,
            errors: std::mem::take(&mut self.records),
            refs: refs.clone(),
        }
        .into())
    }
}
