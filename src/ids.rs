//! Local id assignment and source-to-local id lookup.

use ahash::AHashMap;

use crate::element::ElementKind;
use crate::error::ApiDbError;

/// Source-to-local id mapping for one element kind.
///
/// The storage is abstracted because these maps grow with the input stream:
/// the default is an in-memory hash, but a spillable store can be swapped in
/// without touching any caller.
pub trait IdMap {
    fn insert(&mut self, source_id: i64, local_id: i64);
    fn get(&self, source_id: i64) -> Option<i64>;
    fn contains(&self, source_id: i64) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryIdMap {
    entries: AHashMap<i64, i64>,
}

impl IdMap for InMemoryIdMap {
    fn insert(&mut self, source_id: i64, local_id: i64) {
        self.entries.insert(source_id, local_id);
    }

    fn get(&self, source_id: i64) -> Option<i64> {
        self.entries.get(&source_id).copied()
    }

    fn contains(&self, source_id: i64) -> bool {
        self.entries.contains_key(&source_id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct KindIds {
    next_id: i64,
    map: Box<dyn IdMap>,
}

impl KindIds {
    fn in_memory() -> Self {
        KindIds { next_id: 1, map: Box::<InMemoryIdMap>::default() }
    }
}

/// Hands out dense local ids per element kind, starting from 1 unless a
/// reservation moved the start.
pub struct IdAllocator {
    nodes: KindIds,
    ways: KindIds,
    relations: KindIds,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator {
            nodes: KindIds::in_memory(),
            ways: KindIds::in_memory(),
            relations: KindIds::in_memory(),
        }
    }

    /// Swaps in custom id map storage, e.g. a disk-backed store.
    pub fn with_maps(
        nodes: Box<dyn IdMap>,
        ways: Box<dyn IdMap>,
        relations: Box<dyn IdMap>,
    ) -> Self {
        IdAllocator {
            nodes: KindIds { next_id: 1, map: nodes },
            ways: KindIds { next_id: 1, map: ways },
            relations: KindIds { next_id: 1, map: relations },
        }
    }

    /// Installs the ids an offline reservation fetched from the database.
    pub fn set_start_ids(&mut self, node: i64, way: i64, relation: i64) {
        self.nodes.next_id = node;
        self.ways.next_id = way;
        self.relations.next_id = relation;
    }

    /// Records a new source-to-local mapping and returns the local id.
    /// A source id may only be assigned once per kind.
    pub fn assign(&mut self, kind: ElementKind, source_id: i64) -> Result<i64, ApiDbError> {
        let slot = self.slot_mut(kind);
        if slot.map.contains(source_id) {
            return Err(ApiDbError::UpdateNotSupported { kind, source_id });
        }
        let local_id = slot.next_id;
        slot.map.insert(source_id, local_id);
        slot.next_id += 1;
        Ok(local_id)
    }

    pub fn resolve(&self, kind: ElementKind, source_id: i64) -> Option<i64> {
        self.slot(kind).map.get(source_id)
    }

    fn slot(&self, kind: ElementKind) -> &KindIds {
        match kind {
            ElementKind::Node => &self.nodes,
            ElementKind::Way => &self.ways,
            ElementKind::Relation => &self.relations,
        }
    }

    fn slot_mut(&mut self, kind: ElementKind) -> &mut KindIds {
        match kind {
            ElementKind::Node => &mut self.nodes,
            ElementKind::Way => &mut self.ways,
            ElementKind::Relation => &mut self.relations,
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
