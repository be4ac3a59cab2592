//! Bulk writer module for `apidb-bulk`.
//!
//! This module provides the streaming write path: elements in, one
//! transactional bulk-copy script out, with ids reconciled against the
//! database's shared sequences in offline or online mode.

pub mod bulk_writer;
pub use bulk_writer::rewrite;
pub use bulk_writer::BulkWriter;
