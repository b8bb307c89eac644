//! Incremental writers and readers bound to a content store.
//!
//! A [`ContentWriter`] accepts bytes before the final identifier is known:
//! every byte feeds a running SHA-256, and closing the writer publishes the
//! accumulated content under that hash. A [`ContentReader`] reads an
//! already-stored object through a private cursor.
//!
//! Writer lifecycle is `Open -> Closed`. `close` is idempotent, `finalize`
//! closes if needed and then returns the cached identifier, and writing to
//! a closed writer fails with [`StoreError::WriterClosed`]. If publishing
//! fails the writer ends up `Failed`, and every later call reports
//! [`StoreError::PublishFailed`]. Dropping a writer that is still open
//! discards everything written to it; nothing becomes visible in the store.

use std::io::{self, Read, Write};

use gentledb_types::Identifier;

use crate::error::{StoreError, StoreResult};

/// Incremental producer of one content object.
pub trait ContentWriter: Write + Send {
    /// Publish the bytes written so far. Calling this on a closed writer is
    /// a no-op; calling it after a failed publish returns
    /// [`StoreError::PublishFailed`].
    fn close(&mut self) -> StoreResult<()>;

    /// Close the writer if it is still open, then return the content
    /// identifier.
    fn finalize(&mut self) -> StoreResult<Identifier>;

    /// Whether the writer has left the `Open` state.
    fn is_closed(&self) -> bool;

    /// Total bytes accepted so far.
    fn bytes_written(&self) -> u64;
}

/// Cursor-based consumer of one stored content object.
pub trait ContentReader: Read + Send {
    /// The identifier this reader was opened against.
    fn id(&self) -> &Identifier;

    /// Read up to `size` bytes from the cursor, or everything that remains
    /// when `size` is `None`. Past the end this returns an empty buffer.
    fn read_chunk(&mut self, size: Option<usize>) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        match size {
            None => {
                self.read_to_end(&mut buf)?;
            }
            Some(limit) => {
                Read::take(&mut *self, limit as u64).read_to_end(&mut buf)?;
            }
        }
        Ok(buf)
    }
}

/// Shared `Open -> Closed` bookkeeping for writer implementations.
#[derive(Debug)]
pub(crate) enum WriterState<S> {
    Open(S),
    Closed(Identifier),
    /// Publishing failed; the scratch data is gone.
    Failed,
}

impl<S> WriterState<S> {
    pub(crate) fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub(crate) fn open_mut(&mut self) -> io::Result<&mut S> {
        match self {
            Self::Open(inner) => Ok(inner),
            Self::Closed(_) => Err(StoreError::WriterClosed.into()),
            Self::Failed => Err(StoreError::PublishFailed.into()),
        }
    }

    pub(crate) fn closed_id(&self) -> StoreResult<Identifier> {
        match self {
            Self::Closed(id) => Ok(*id),
            Self::Open(_) => Err(StoreError::WriterClosed),
            Self::Failed => Err(StoreError::PublishFailed),
        }
    }

    /// Take the open payload out, leaving `Failed` behind until the caller
    /// records the outcome. `Ok(None)` means the writer was already closed.
    pub(crate) fn take_open(&mut self) -> StoreResult<Option<S>> {
        match std::mem::replace(self, Self::Failed) {
            Self::Open(inner) => Ok(Some(inner)),
            Self::Failed => Err(StoreError::PublishFailed),
            other => {
                *self = other;
                Ok(None)
            }
        }
    }
}
