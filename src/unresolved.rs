//! Forward references from relations to members not yet seen in the stream.

use ahash::AHashMap;

use crate::element::ElementKind;

/// A relation member whose target had not arrived when the relation was
/// written.  Emitted as soon as the target's local id is assigned.
#[derive(Debug, Clone)]
pub struct PendingMember {
    pub relation_source_id: i64,
    pub relation_local_id: i64,
    pub role: String,
    pub sequence_index: usize,
}

/// Multimap from an expected member's (kind, source id) to every relation
/// reference waiting on it, in insertion order.
#[derive(Default)]
pub struct UnresolvedIndex {
    refs: AHashMap<(ElementKind, i64), Vec<PendingMember>>,
    pending: usize,
}

impl UnresolvedIndex {
    pub fn record(&mut self, kind: ElementKind, source_id: i64, member: PendingMember) {
        self.refs.entry((kind, source_id)).or_default().push(member);
        self.pending += 1;
    }

    /// Removes and returns all references waiting on the given element.
    pub fn take(&mut self, kind: ElementKind, source_id: i64) -> Vec<PendingMember> {
        let taken = self.refs.remove(&(kind, source_id)).unwrap_or_default();
        self.pending -= taken.len();
        taken
    }

    pub fn len(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn clear(&mut self) {
        self.refs.clear();
        self.pending = 0;
    }
}
