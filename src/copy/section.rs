//! Named temporary-file sections, one per target table.
//!
//! Rows arrive interleaved by element order but the final script must list
//! whole tables in a fixed global order, so every table buffers into its own
//! temp file and the store concatenates them during assembly.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use log::{debug, trace};
use tempfile::NamedTempFile;

use crate::error::ApiDbError;

/// Pseudo-section holding only the UTF-8 byte-order mark.
pub const BYTE_ORDER_MARK: &str = "byte_order_mark";
/// Pseudo-section holding `setval` statements instead of copy data.
pub const SEQUENCE_UPDATES: &str = "sequence_updates";

/// The fixed order in which sections are concatenated into the script.
pub const CANONICAL_SECTION_ORDER: [&str; 19] = [
    BYTE_ORDER_MARK,
    SEQUENCE_UPDATES,
    "changesets",
    "current_nodes",
    "current_node_tags",
    "nodes",
    "node_tags",
    "current_ways",
    "current_way_nodes",
    "current_way_tags",
    "ways",
    "way_nodes",
    "way_tags",
    "current_relations",
    "current_relation_members",
    "current_relation_tags",
    "relations",
    "relation_members",
    "relation_tags",
];

/// The `COPY` header line for a copy-data table, `None` for pseudo-sections.
pub fn copy_header(table: &str) -> Option<&'static str> {
    let header = match table {
        "changesets" => {
            "COPY changesets (id, user_id, created_at, min_lat, max_lat, min_lon, max_lon, closed_at, num_changes) FROM stdin;\n"
        }
        "current_nodes" => {
            "COPY current_nodes (id, latitude, longitude, changeset_id, visible, \"timestamp\", tile, version) FROM stdin;\n"
        }
        "current_node_tags" => "COPY current_node_tags (node_id, k, v) FROM stdin;\n",
        "nodes" => {
            "COPY nodes (node_id, latitude, longitude, changeset_id, visible, \"timestamp\", tile, version, redaction_id) FROM stdin;\n"
        }
        "node_tags" => "COPY node_tags (node_id, version, k, v) FROM stdin;\n",
        "current_ways" => {
            "COPY current_ways (id, changeset_id, \"timestamp\", visible, version) FROM stdin;\n"
        }
        "current_way_nodes" => {
            "COPY current_way_nodes (way_id, node_id, sequence_id) FROM stdin;\n"
        }
        "current_way_tags" => "COPY current_way_tags (way_id, k, v) FROM stdin;\n",
        "ways" => {
            "COPY ways (way_id, changeset_id, \"timestamp\", version, visible, redaction_id) FROM stdin;\n"
        }
        "way_nodes" => "COPY way_nodes (way_id, node_id, version, sequence_id) FROM stdin;\n",
        "way_tags" => "COPY way_tags (way_id, version, k, v) FROM stdin;\n",
        "current_relations" => {
            "COPY current_relations (id, changeset_id, \"timestamp\", visible, version) FROM stdin;\n"
        }
        "current_relation_members" => {
            "COPY current_relation_members (relation_id, member_type, member_id, member_role, sequence_id) FROM stdin;\n"
        }
        "current_relation_tags" => {
            "COPY current_relation_tags (relation_id, k, v) FROM stdin;\n"
        }
        "relations" => {
            "COPY relations (relation_id, changeset_id, \"timestamp\", version, visible, redaction_id) FROM stdin;\n"
        }
        "relation_members" => {
            "COPY relation_members (relation_id, member_type, member_id, member_role, version, sequence_id) FROM stdin;\n"
        }
        "relation_tags" => "COPY relation_tags (relation_id, version, k, v) FROM stdin;\n",
        _ => return None,
    };
    Some(header)
}

fn is_copy_data(table: &str) -> bool {
    table != BYTE_ORDER_MARK && table != SEQUENCE_UPDATES
}

struct Section {
    writer: BufWriter<NamedTempFile>,
    pending_lines: usize,
}

/// Set of open sections keyed by table name.  Section files are unlinked as
/// soon as their contents are appended to the script, or on drop.
pub struct SectionStore {
    sections: HashMap<String, Section>,
    line_buffer_size: usize,
}

impl SectionStore {
    pub fn new(line_buffer_size: usize) -> Self {
        SectionStore { sections: HashMap::new(), line_buffer_size }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.sections.contains_key(table)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Opens a section if it is not open yet, writing `header` as its first
    /// line.  `with_bom` prepends the UTF-8 byte-order mark.
    pub fn ensure(&mut self, table: &str, header: &str, with_bom: bool) -> Result<(), ApiDbError> {
        if self.sections.contains_key(table) {
            return Ok(());
        }
        let file = NamedTempFile::new()?;
        trace!("opened section file {} for table {}", file.path().display(), table);
        let mut writer = BufWriter::new(file);
        if with_bom {
            writer.write_all("\u{feff}".as_bytes())?;
        }
        writer.write_all(header.as_bytes())?;
        self.sections.insert(table.to_string(), Section { writer, pending_lines: 0 });
        Ok(())
    }

    /// Opens a copy-data section with its canonical `COPY` header.
    pub fn ensure_copy(&mut self, table: &str) -> Result<(), ApiDbError> {
        let header = copy_header(table).ok_or_else(|| {
            ApiDbError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{table} is not a copy-data table"),
            ))
        })?;
        self.ensure(table, header, false)
    }

    /// Appends one row; every row must end with a newline.
    pub fn write(&mut self, table: &str, line: &str) -> Result<(), ApiDbError> {
        let line_buffer_size = self.line_buffer_size;
        let section = self.section_mut(table)?;
        section.writer.write_all(line.as_bytes())?;
        section.pending_lines += 1;
        if section.pending_lines >= line_buffer_size {
            section.writer.flush()?;
            section.pending_lines = 0;
        }
        Ok(())
    }

    /// Forces the section's writer and its backing file to disk.
    pub fn flush(&mut self, table: &str) -> Result<(), ApiDbError> {
        let section = self.section_mut(table)?;
        section.writer.flush()?;
        section.writer.get_ref().as_file().sync_all()?;
        section.pending_lines = 0;
        Ok(())
    }

    /// Flushes a section and reads its full contents back.
    pub fn read_back(&mut self, table: &str) -> Result<String, ApiDbError> {
        self.flush(table)?;
        let section = self.section_mut(table)?;
        let mut contents = String::new();
        section.writer.get_ref().reopen()?.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// Appends every present section to `out` in [`CANONICAL_SECTION_ORDER`],
    /// terminating copy-data sections with `\.` and two blank lines.  Each
    /// section's temp file is removed once copied.  Returns the number of
    /// lines written.
    pub fn drain_into(
        &mut self,
        out: &mut dyn Write,
        skip: &[&str],
        status_update_interval: u64,
    ) -> Result<u64, ApiDbError> {
        let mut total_lines = 0u64;
        let mut pending = 0usize;
        for table in CANONICAL_SECTION_ORDER {
            if skip.contains(&table) {
                trace!("skipping section {table}");
                continue;
            }
            let Some(mut section) = self.sections.remove(table) else {
                trace!("no data for table {table}");
                continue;
            };
            if is_copy_data(table) {
                section.writer.write_all(b"\\.\n\n\n")?;
            }
            section.writer.flush()?;
            let file = section.writer.into_inner().map_err(|e| e.into_error())?;
            trace!("appending contents of section {table}");
            let reader = BufReader::new(file.reopen()?);
            for line in reader.lines() {
                let line = line?;
                out.write_all(line.as_bytes())?;
                out.write_all(b"\n")?;
                total_lines += 1;
                pending += 1;
                if pending >= self.line_buffer_size {
                    out.flush()?;
                    pending = 0;
                }
                if status_update_interval > 0 && total_lines % status_update_interval == 0 {
                    debug!("parsed {total_lines} SQL lines for the output file");
                }
            }
            // dropping `file` unlinks the section's temp path
        }
        out.flush()?;
        Ok(total_lines)
    }

    /// Drops all open sections and their temp files.
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    fn section_mut(&mut self, table: &str) -> Result<&mut Section, ApiDbError> {
        self.sections.get_mut(table).ok_or_else(|| {
            ApiDbError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no open section for table {table}"),
            ))
        })
    }
}
