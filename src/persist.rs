//! Format headers for persisted state.
//!
//! Every persisted record stream starts with a [`Header`] naming what it holds
//! and which layout version wrote it. Loading checks the header against the
//! kind the caller asked for, so the concrete types chosen at startup decide
//! how bytes are decoded. There is no global type registry.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Kinds of persisted record streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A serialized policy table.
    PolicyTable,
    /// Reservoir buffer metadata.
    ReservoirMeta,
}

/// Leading record of every persisted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    magic: [u8; 4],
    kind: RecordKind,
    version: u32,
}

const MAGIC: [u8; 4] = *b"MCFR";
const VERSION: u32 = 1;

impl Header {
    /// Header written by this build for `kind`.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            magic: MAGIC,
            kind,
            version: VERSION,
        }
    }

    /// Write this header to `writer`.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Read a header and check it matches what this build writes for `kind`.
    pub fn expect<R: Read>(reader: R, kind: RecordKind) -> Result<()> {
        let expected = Header::new(kind);
        let found: Header = bincode::deserialize_from(reader)?;
        if found != expected {
            return Err(SolverError::Format {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{:?}/v{}",
            String::from_utf8_lossy(&self.magic),
            self.kind,
            self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let mut buf = Vec::new();
        Header::new(RecordKind::PolicyTable).write(&mut buf).unwrap();
        assert!(Header::expect(buf.as_slice(), RecordKind::PolicyTable).is_ok());
    }

    #[test]
    fn test_header_kind_mismatch() {
        let mut buf = Vec::new();
        Header::new(RecordKind::ReservoirMeta).write(&mut buf).unwrap();
        let err = Header::expect(buf.as_slice(), RecordKind::PolicyTable).unwrap_err();
        assert!(matches!(err, SolverError::Format { .. }));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let buf = vec![0u8; 3];
        assert!(Header::expect(buf.as_slice(), RecordKind::PolicyTable).is_err());
    }
}
