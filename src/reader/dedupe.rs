use hashbrown::HashSet;
use tracing::trace;

use crate::record::Record;

use super::{ReadError, RecordSource};

/// Passes through only the first record for each fingerprint.
///
/// The seen-set lives as long as the reader and is never shared.
pub struct DedupeReader<S> {
    inner: S,
    seen: HashSet<String>,
    returned: usize,
    duplicates: usize,
}

impl<S: RecordSource> DedupeReader<S> {
    /// Wraps `inner` with an empty seen-set.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            returned: 0,
            duplicates: 0,
        }
    }

    /// Records discarded as duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the source, discarding the seen-set.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordSource> RecordSource for DedupeReader<S> {
    fn next_record(&mut self) -> Result<Option<Record>, ReadError> {
        while let Some(record) = self.inner.next_record()? {
            let fp = record.fingerprint();
            if self.seen.contains(&fp) {
                self.duplicates += 1;
                trace!(fingerprint = %fp, "dropping duplicate");
                continue;
            }
            self.seen.insert(fp);
            self.returned += 1;
            return Ok(Some(record));
        }
        Ok(None)
    }

    fn record_count(&self) -> usize {
        self.returned
    }
}
