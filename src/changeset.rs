//! Changeset accounting: bounded change counts and the running bounding box.

use crate::tile;

/// Bounds of the coordinates written into the current changeset.  Empty until
/// the first node expands it.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        }
    }

    pub fn expand(&mut self, lon: f64, lat: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat
    }

    /// Fixed-point (min_lat, max_lat, min_lon, max_lon) as stored in the
    /// changesets table.  An empty box serialises as zeros.
    pub fn scaled(&self) -> (i64, i64, i64, i64) {
        if self.is_empty() {
            return (0, 0, 0, 0);
        }
        (
            tile::scale_coordinate(self.min_lat),
            tile::scale_coordinate(self.max_lat),
            tile::scale_coordinate(self.min_lon),
            tile::scale_coordinate(self.max_lon),
        )
    }
}

/// Groups element writes into changesets of bounded size.
///
/// The caller counts each element with [`increment`](Self::increment); when
/// the current changeset is full it flushes a row and calls
/// [`rotate`](Self::rotate), which moves to the next changeset id with a
/// fresh counter and bounding box.
pub struct ChangesetAccumulator {
    user_id: i64,
    current_id: i64,
    changes_in_current: u64,
    changesets_written: u64,
    bbox: BoundingBox,
}

impl ChangesetAccumulator {
    pub fn new(user_id: i64) -> Self {
        ChangesetAccumulator {
            user_id,
            current_id: 1,
            changes_in_current: 0,
            changesets_written: 0,
            bbox: BoundingBox::empty(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn current_id(&self) -> i64 {
        self.current_id
    }

    pub fn changes_in_current(&self) -> u64 {
        self.changes_in_current
    }

    pub fn changesets_written(&self) -> u64 {
        self.changesets_written
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Installs the changeset id an offline reservation fetched.
    pub fn set_start_id(&mut self, id: i64) {
        self.current_id = id;
    }

    pub fn expand_bbox(&mut self, lon: f64, lat: f64) {
        self.bbox.expand(lon, lat);
    }

    pub fn increment(&mut self) {
        self.changes_in_current += 1;
    }

    /// Starts the next changeset after a full one was flushed.
    pub fn rotate(&mut self) {
        self.current_id += 1;
        self.changes_in_current = 0;
        self.bbox = BoundingBox::empty();
        self.changesets_written += 1;
    }

    /// Accounts for the trailing, partially filled changeset flushed during
    /// finalize.  The current id stays, since no further changes follow.
    pub fn close_current(&mut self) {
        self.changes_in_current = 0;
        self.bbox = BoundingBox::empty();
        self.changesets_written += 1;
    }
}
