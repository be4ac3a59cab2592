//! Second-pass id offset rewrite for online mode.
//!
//! After the sequences have been advanced, every id column in the assembled
//! script is shifted by its table's reserved base.  The pass is a pure
//! function of the input script and the four bases.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::db::ReservedIds;
use crate::element::ElementKind;
use crate::error::ApiDbError;

/// Streams `input` to `out`, adding the reserved bases to every id column of
/// every copy-data record.  SQL statements, copy headers, terminators and
/// blank lines pass through unchanged.  Returns the number of lines written.
pub fn rewrite_id_offsets<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    bases: &ReservedIds,
    line_buffer_size: usize,
    status_update_interval: u64,
) -> Result<u64, ApiDbError> {
    let mut current_table = String::new();
    let mut total_lines = 0u64;
    let mut pending = 0usize;

    for line in input.lines() {
        let mut line = line?;
        if line.contains("COPY") {
            current_table = line.split_whitespace().nth(1).unwrap_or_default().to_string();
        } else if line.is_empty() || line == "\\." {
            current_table.clear();
        } else if !current_table.is_empty() {
            line = rewrite_record(&current_table, &line, bases)?;
        }

        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        total_lines += 1;
        pending += 1;
        if pending >= line_buffer_size {
            out.flush()?;
            pending = 0;
        }
        if status_update_interval > 0 && total_lines % status_update_interval == 0 {
            debug!("parsed {total_lines} lines for SQL id offset updates");
        }
    }
    out.flush()?;
    Ok(total_lines)
}

fn rewrite_record(table: &str, line: &str, bases: &ReservedIds) -> Result<String, ApiDbError> {
    let mut fields: Vec<String> = line.split('\t').map(String::from).collect();

    match table {
        "changesets" => {
            add_offset(&mut fields, 0, bases.changeset)?;
        }
        "current_nodes" | "nodes" => {
            add_offset(&mut fields, 0, bases.node)?;
            add_offset(&mut fields, 3, bases.changeset)?;
        }
        "current_ways" | "ways" => {
            add_offset(&mut fields, 0, bases.way)?;
            add_offset(&mut fields, 1, bases.changeset)?;
        }
        "current_way_nodes" | "way_nodes" => {
            add_offset(&mut fields, 0, bases.way)?;
            add_offset(&mut fields, 1, bases.node)?;
        }
        "current_relations" | "relations" => {
            add_offset(&mut fields, 0, bases.relation)?;
            add_offset(&mut fields, 1, bases.changeset)?;
        }
        "current_relation_members" | "relation_members" => {
            add_offset(&mut fields, 0, bases.relation)?;
            let member_type = field(&fields, 1)?;
            let member_base = match ElementKind::from_member_type(member_type) {
                Some(ElementKind::Node) => bases.node,
                Some(ElementKind::Way) => bases.way,
                Some(ElementKind::Relation) => bases.relation,
                None => {
                    return Err(ApiDbError::UnsupportedElementKind(member_type.to_string()));
                }
            };
            add_offset(&mut fields, 2, member_base)?;
        }
        "current_node_tags" | "node_tags" => {
            add_offset(&mut fields, 0, bases.node)?;
        }
        "current_way_tags" | "way_tags" => {
            add_offset(&mut fields, 0, bases.way)?;
        }
        "current_relation_tags" | "relation_tags" => {
            add_offset(&mut fields, 0, bases.relation)?;
        }
        _ => return Ok(line.to_string()),
    }

    Ok(fields.join("\t"))
}

fn field<'a>(fields: &'a [String], index: usize) -> Result<&'a str, ApiDbError> {
    fields.get(index).map(String::as_str).ok_or_else(|| malformed_record(fields, index))
}

fn add_offset(fields: &mut [String], index: usize, base: i64) -> Result<(), ApiDbError> {
    let value: i64 = field(fields, index)?
        .parse()
        .map_err(|_| malformed_record(fields, index))?;
    fields[index] = (value + base).to_string();
    Ok(())
}

fn malformed_record(fields: &[String], index: usize) -> ApiDbError {
    ApiDbError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("copy record {:?} has no numeric id at column {index}", fields.join("\t")),
    ))
}
