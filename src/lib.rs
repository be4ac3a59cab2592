//! Streaming bulk writer for OSM API database schemas.
//!
//! The crate turns a stream of map elements (nodes, ways, relations) into a
//! single transactional SQL script of `COPY ... FROM stdin` sections that a
//! bulk-load client can apply in one pass.  [`writer::BulkWriter`] assigns
//! dense local ids while the stream is serialized and reconciles them against
//! the live database's shared sequences, either by reserving ids up front
//! (offline mode) or by rewriting the finished script against a sequence
//! reservation taken at the end (online mode).

pub mod changeset;
pub mod clock;
pub mod config;
pub mod db;
pub mod element;
pub mod error;
pub mod ids;
pub mod stats;
pub mod tile;
pub mod unresolved;
pub mod writer;

pub mod copy {
    pub mod escape;
    pub mod section;
}
