//! The seam between the writer core and the actual database.
//!
//! The core never opens connections itself; everything it needs from the
//! database arrives through the [`ApiDriver`] capability, so connection
//! pooling, authentication and retry policy stay with the host.

use std::path::Path;

use crate::error::ApiDbError;

/// The four shared sequences the writer reconciles ids against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Changesets,
    Nodes,
    Ways,
    Relations,
}

impl SequenceKind {
    pub fn sequence_name(self) -> &'static str {
        match self {
            SequenceKind::Changesets => "changesets_id_seq",
            SequenceKind::Nodes => "current_nodes_id_seq",
            SequenceKind::Ways => "current_ways_id_seq",
            SequenceKind::Relations => "current_relations_id_seq",
        }
    }
}

/// Injected database capability.
pub trait ApiDriver {
    /// Whether this driver can handle the given url.
    fn is_supported(&self, url: &str) -> bool;

    fn open(&mut self, url: &str) -> Result<(), ApiDbError>;

    fn close(&mut self);

    /// The next available value of a sequence.
    fn next_id(&mut self, sequence: SequenceKind) -> Result<i64, ApiDbError>;

    /// Executes the given statements inside one transaction.
    fn exec_transactional(&mut self, sql: &str) -> Result<(), ApiDbError>;

    /// Bulk-executes a finished script file against the database.
    fn exec_script(&mut self, path: &Path) -> Result<(), ApiDbError>;
}

/// Sequence values fetched from the database: the final start ids in offline
/// mode, the rewrite bases in online mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedIds {
    pub changeset: i64,
    pub node: i64,
    pub way: i64,
    pub relation: i64,
}

impl ReservedIds {
    /// Defaults used when no reservation was taken, matching the local id
    /// numbering that starts at 1.
    pub fn unreserved() -> Self {
        ReservedIds { changeset: 1, node: 1, way: 1, relation: 1 }
    }
}

pub fn setval_statement(sequence: SequenceKind, value: i64) -> String {
    format!("SELECT pg_catalog.setval('{}', {});\n", sequence.sequence_name(), value)
}
