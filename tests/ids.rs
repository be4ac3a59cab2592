use apidb_bulk::element::ElementKind;
use apidb_bulk::error::ApiDbError;
use apidb_bulk::ids::{IdAllocator, IdMap, InMemoryIdMap};
use apidb_bulk::unresolved::{PendingMember, UnresolvedIndex};

#[test]
fn local_ids_are_dense_per_kind() -> Result<(), ApiDbError> {
    let mut ids = IdAllocator::new();
    assert_eq!(ids.assign(ElementKind::Node, -10)?, 1);
    assert_eq!(ids.assign(ElementKind::Node, -20)?, 2);
    assert_eq!(ids.assign(ElementKind::Way, -10)?, 1);
    assert_eq!(ids.assign(ElementKind::Relation, 99)?, 1);
    assert_eq!(ids.resolve(ElementKind::Node, -20), Some(2));
    assert_eq!(ids.resolve(ElementKind::Way, -20), None);
    Ok(())
}

#[test]
fn reassigning_a_source_id_fails() {
    let mut ids = IdAllocator::new();
    ids.assign(ElementKind::Node, -1).unwrap();
    let err = ids.assign(ElementKind::Node, -1).unwrap_err();
    assert!(matches!(
        err,
        ApiDbError::UpdateNotSupported { kind: ElementKind::Node, source_id: -1 }
    ));
}

#[test]
fn start_ids_can_come_from_a_reservation() -> Result<(), ApiDbError> {
    let mut ids = IdAllocator::new();
    ids.set_start_ids(100, 200, 300);
    assert_eq!(ids.assign(ElementKind::Node, -1)?, 100);
    assert_eq!(ids.assign(ElementKind::Way, -1)?, 200);
    assert_eq!(ids.assign(ElementKind::Relation, -1)?, 300);
    assert_eq!(ids.assign(ElementKind::Node, -2)?, 101);
    Ok(())
}

#[test]
fn custom_map_storage_can_be_swapped_in() -> Result<(), ApiDbError> {
    let mut ids = IdAllocator::with_maps(
        Box::<InMemoryIdMap>::default(),
        Box::<InMemoryIdMap>::default(),
        Box::<InMemoryIdMap>::default(),
    );
    assert_eq!(ids.assign(ElementKind::Node, 5)?, 1);
    assert_eq!(ids.resolve(ElementKind::Node, 5), Some(1));
    Ok(())
}

#[test]
fn id_map_tracks_membership_and_size() {
    let mut map = InMemoryIdMap::default();
    assert!(map.is_empty());
    map.insert(-5, 1);
    map.insert(7, 2);
    assert_eq!(map.len(), 2);
    assert!(map.contains(-5));
    assert_eq!(map.get(7), Some(2));
    assert_eq!(map.get(8), None);
}

fn pending(relation: i64, local: i64, role: &str, sequence_index: usize) -> PendingMember {
    PendingMember {
        relation_source_id: relation,
        relation_local_id: local,
        role: role.to_string(),
        sequence_index,
    }
}

#[test]
fn unresolved_refs_drain_in_insertion_order() {
    let mut index = UnresolvedIndex::default();
    index.record(ElementKind::Node, -5, pending(-100, 1, "stop", 1));
    index.record(ElementKind::Node, -5, pending(-101, 2, "platform", 3));
    index.record(ElementKind::Way, -5, pending(-100, 1, "outer", 2));
    assert_eq!(index.len(), 3);

    let taken = index.take(ElementKind::Node, -5);
    assert_eq!(taken.len(), 2);
    assert_eq!(taken[0].relation_source_id, -100);
    assert_eq!(taken[0].role, "stop");
    assert_eq!(taken[1].relation_source_id, -101);
    assert_eq!(taken[1].sequence_index, 3);

    assert_eq!(index.len(), 1);
    assert!(index.take(ElementKind::Node, -5).is_empty());
    assert!(!index.is_empty());
    index.clear();
    assert!(index.is_empty());
}
