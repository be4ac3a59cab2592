use thiserror::Error;

use crate::element::ElementKind;

#[derive(Debug, Error)]
pub enum ApiDbError {
    #[error("database already open; close the existing connection before opening a new one")]
    AlreadyOpen,

    #[error("could not open url {0}")]
    UnsupportedUrl(String),

    #[error("writer does not support update operations: {kind} {source_id} was already written")]
    UpdateNotSupported { kind: ElementKind, source_id: i64 },

    #[error("unresolved way nodes are not supported: way {way_id} has a reference to unknown node {node_id}")]
    UnresolvedWayNode { way_id: i64, node_id: i64 },

    #[error("invalid changeset user id: {0}")]
    InvalidUserId(i64),

    #[error("invalid latitude conversion: {latitude} scales to {scaled}")]
    InvalidLatitude { latitude: f64, scaled: i64 },

    #[error("invalid longitude conversion: {longitude} scales to {scaled}")]
    InvalidLongitude { longitude: f64, scaled: i64 },

    #[error("unsupported element member type: {0:?}")]
    UnsupportedElementKind(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(String),
}
