use apidb_bulk::db::ReservedIds;
use apidb_bulk::error::ApiDbError;
use apidb_bulk::writer::rewrite::rewrite_id_offsets;

fn rewrite(script: &str, bases: &ReservedIds) -> Result<String, ApiDbError> {
    let mut out = Vec::new();
    rewrite_id_offsets(script.as_bytes(), &mut out, bases, 100, 0)?;
    Ok(String::from_utf8(out).unwrap())
}

const BASES: ReservedIds = ReservedIds { changeset: 100, node: 1000, way: 2000, relation: 3000 };

#[test]
fn node_rows_get_node_and_changeset_offsets() -> Result<(), ApiDbError> {
    let script = "COPY current_nodes (id, latitude, longitude, changeset_id, visible, \"timestamp\", tile, version) FROM stdin;\n\
                  1\t10000000\t20000000\t1\tt\tnow\t42\t1\n\
                  \\.\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.contains("1001\t10000000\t20000000\t101\tt\tnow\t42\t1\n"));
    Ok(())
}

#[test]
fn way_node_rows_get_way_and_node_offsets() -> Result<(), ApiDbError> {
    let script = "COPY way_nodes (way_id, node_id, version, sequence_id) FROM stdin;\n\
                  1\t1\t1\t1\n\
                  \\.\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.contains("2001\t1001\t1\t1\n"));
    Ok(())
}

#[test]
fn member_offset_depends_on_member_type() -> Result<(), ApiDbError> {
    let script = "COPY current_relation_members (relation_id, member_type, member_id, member_role, sequence_id) FROM stdin;\n\
                  1\tNode\t5\touter\t1\n\
                  1\tWay\t5\tinner\t2\n\
                  1\tRelation\t5\t\t3\n\
                  \\.\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.contains("3001\tNode\t1005\touter\t1\n"));
    assert!(out.contains("3001\tWay\t2005\tinner\t2\n"));
    assert!(out.contains("3001\tRelation\t3005\t\t3\n"));
    Ok(())
}

#[test]
fn unknown_member_type_is_rejected() {
    let script = "COPY relation_members (relation_id, member_type, member_id, member_role, version, sequence_id) FROM stdin;\n\
                  1\tArea\t5\t\t1\t1\n";
    let err = rewrite(script, &BASES).unwrap_err();
    assert!(matches!(err, ApiDbError::UnsupportedElementKind(kind) if kind == "Area"));
}

#[test]
fn sql_headers_terminators_and_blanks_pass_through() -> Result<(), ApiDbError> {
    let script = "BEGIN TRANSACTION;\n\
                  COPY changesets (id, user_id, created_at, min_lat, max_lat, min_lon, max_lon, closed_at, num_changes) FROM stdin;\n\
                  1\t17\tnow\t0\t0\t0\t0\tnow\t1\n\
                  \\.\n\
                  \n\
                  \n\
                  COMMIT;\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.starts_with("BEGIN TRANSACTION;\n"));
    assert!(out.contains("COPY changesets (id, user_id, created_at, min_lat, max_lat, min_lon, max_lon, closed_at, num_changes) FROM stdin;\n"));
    assert!(out.contains("101\t17\tnow\t0\t0\t0\t0\tnow\t1\n"));
    assert!(out.contains("\\.\n\n\nCOMMIT;\n"));
    Ok(())
}

#[test]
fn terminator_closes_the_copy_section() -> Result<(), ApiDbError> {
    // the setval after the terminator must not be treated as a record
    let script = "COPY node_tags (node_id, version, k, v) FROM stdin;\n\
                  1\t1\tname\tvalue\n\
                  \\.\n\
                  SELECT pg_catalog.setval('current_nodes_id_seq', 1);\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.contains("1001\t1\tname\tvalue\n"));
    assert!(out.contains("SELECT pg_catalog.setval('current_nodes_id_seq', 1);\n"));
    Ok(())
}

#[test]
fn rewrite_with_zero_bases_is_idempotent() -> Result<(), ApiDbError> {
    let zero = ReservedIds { changeset: 0, node: 0, way: 0, relation: 0 };
    let script = "BEGIN TRANSACTION;\n\
                  COPY current_ways (id, changeset_id, \"timestamp\", visible, version) FROM stdin;\n\
                  3\t2\tnow\tt\t1\n\
                  \\.\n\
                  \n\
                  \n\
                  COMMIT;";
    let once = rewrite(script, &zero)?;
    let twice = rewrite(&once, &zero)?;
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn tag_values_survive_the_rewrite() -> Result<(), ApiDbError> {
    let script = "COPY current_way_tags (way_id, k, v) FROM stdin;\n\
                  7\tnote\tcontains\\ttab text\n\
                  \\.\n";
    let out = rewrite(script, &BASES)?;
    assert!(out.contains("2007\tnote\tcontains\\ttab text\n"));
    Ok(())
}
