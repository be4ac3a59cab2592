//! Implementation of the BulkWriter struct split across several submodules

use std::fs;
use std::io::{BufReader, BufWriter};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::changeset::ChangesetAccumulator;
use crate::clock::{Clock, SystemClock};
use crate::config::{WriteMode, WriterConfig};
use crate::copy::section::{self, SectionStore};
use crate::db::{self, ApiDriver, ReservedIds, SequenceKind};
use crate::element::Element;
use crate::error::ApiDbError;
use crate::ids::IdAllocator;
use crate::stats::WriteStats;
use crate::unresolved::UnresolvedIndex;

mod assemble;
mod emit;
pub mod rewrite;

/// Streaming writer translating map elements into one bulk-copy SQL script.
///
/// Elements are accepted in any order; relation members may reference
/// elements that arrive later in the stream.  The writer holds one section
/// file per target table and concatenates them in canonical order during
/// [`finalize`](Self::finalize).
pub struct BulkWriter {
    config: WriterConfig,
    driver: Box<dyn ApiDriver>,
    clock: Box<dyn Clock>,
    sections: SectionStore,
    ids: IdAllocator,
    unresolved: UnresolvedIndex,
    changesets: ChangesetAccumulator,
    stats: WriteStats,
    reserved: Option<ReservedIds>,
    url: Option<String>,
    open: bool,
}

impl BulkWriter {
    pub fn new(config: WriterConfig, driver: Box<dyn ApiDriver>) -> Self {
        Self::with_clock(config, driver, Box::new(SystemClock))
    }

    /// Builds a writer with an injected clock, pinning row timestamps.
    pub fn with_clock(
        config: WriterConfig,
        driver: Box<dyn ApiDriver>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let sections = SectionStore::new(config.file_output_line_buffer_size);
        let changesets = ChangesetAccumulator::new(config.user_id);
        BulkWriter {
            driver,
            clock,
            sections,
            ids: IdAllocator::new(),
            unresolved: UnresolvedIndex::default(),
            changesets,
            stats: WriteStats::default(),
            reserved: None,
            url: None,
            open: false,
            config,
        }
    }

    pub fn is_supported(&self, url: &str) -> bool {
        self.driver.is_supported(url)
    }

    /// Opens the writer against a database url.  In offline mode the
    /// sequence values are fetched now, so emitted ids are already final.
    pub fn open(&mut self, url: &str) -> Result<(), ApiDbError> {
        if self.open {
            return Err(ApiDbError::AlreadyOpen);
        }
        if !self.driver.is_supported(url) {
            return Err(ApiDbError::UnsupportedUrl(url.to_string()));
        }
        self.driver.open(url)?;
        self.url = Some(url.to_string());
        self.open = true;

        if self.config.mode == WriteMode::Offline {
            self.reserve_offline()?;
        }
        Ok(())
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// Accepts one element from the stream.
    pub fn write(&mut self, element: &Element) -> Result<(), ApiDbError> {
        match element {
            Element::Node(node) => self.write_node(node),
            Element::Way(way) => self.write_way(way),
            Element::Relation(relation) => self.write_relation(relation),
        }
    }

    /// Assembles the final script, reconciles ids with the database and
    /// optionally copies or executes the result.  A run that wrote no
    /// elements finalizes to nothing.
    pub fn finalize(&mut self) -> Result<(), ApiDbError> {
        if self.stats.elements_written() == 0 {
            debug!("no data written");
            return Ok(());
        }

        self.sections.ensure(section::BYTE_ORDER_MARK, "\n", true)?;

        if self.changesets.changes_in_current() > 0 {
            self.flush_changeset_row()?;
            self.changesets.close_current();
        }
        self.stats.changesets_written = self.changesets.changesets_written();
        self.stats.relation_members_unresolved = self.unresolved.len() as u64;

        if self.config.mode == WriteMode::Offline {
            // ids were already final, so the sequences just have to catch up
            // with the highest id each table used
            self.write_offline_sequence_updates()?;
        }

        let script = self.assemble_script()?;

        let final_script = if self.config.mode == WriteMode::Online {
            let bases = self.reserve_online()?;
            info!("updating id offsets in SQL file, data pass #2 of 2");
            let rewritten = NamedTempFile::new()?;
            {
                let input = BufReader::new(script.reopen()?);
                let out = BufWriter::new(rewritten.as_file());
                let total = rewrite::rewrite_id_offsets(
                    input,
                    out,
                    &bases,
                    self.config.file_output_line_buffer_size,
                    self.config.status_update_interval,
                )?;
                debug!("parsed {total} lines for id offset updates, data pass #2 of 2");
            }
            rewritten
        } else {
            script
        };

        if let Some(dest) = self.config.sql_file_copy_location.clone() {
            if dest.exists() {
                let _ = fs::remove_file(&dest);
            }
            info!("copying SQL output file to {}", dest.display());
            match fs::copy(final_script.path(), &dest) {
                Ok(_) => debug!("copied SQL file output to {}", dest.display()),
                Err(e) => warn!("unable to copy SQL output file to {}: {e}", dest.display()),
            }
        }

        if self.config.execute_sql {
            info!("executing element SQL for {} records", self.stats.total_records());
            self.driver.exec_script(final_script.path())?;
            info!("element SQL execution complete");
        } else {
            debug!("skipping SQL execution against the database");
        }

        if self.stats.relation_members_unresolved > 0 {
            warn!(
                "dropped {} relation member references that never resolved",
                self.stats.relation_members_unresolved
            );
        }
        self.log_stats();
        Ok(())
    }

    /// Closes the driver and resets all state; the writer can be reused.
    pub fn close(&mut self) {
        self.driver.close();
        self.reset();
    }

    fn reset(&mut self) {
        debug!("resetting writer state");
        self.sections = SectionStore::new(self.config.file_output_line_buffer_size);
        self.ids = IdAllocator::new();
        self.unresolved.clear();
        self.changesets = ChangesetAccumulator::new(self.config.user_id);
        self.stats = WriteStats::default();
        self.reserved = None;
        self.url = None;
        self.open = false;
    }

    fn fetch_sequence_ids(&mut self) -> Result<ReservedIds, ApiDbError> {
        Ok(ReservedIds {
            changeset: self.driver.next_id(SequenceKind::Changesets)?,
            node: self.driver.next_id(SequenceKind::Nodes)?,
            way: self.driver.next_id(SequenceKind::Ways)?,
            relation: self.driver.next_id(SequenceKind::Relations)?,
        })
    }

    fn reserve_offline(&mut self) -> Result<(), ApiDbError> {
        debug!("retrieving current ids from the database");
        let start = self.fetch_sequence_ids()?;
        self.ids.set_start_ids(start.node, start.way, start.relation);
        self.changesets.set_start_id(start.changeset);
        self.reserved = Some(start);
        Ok(())
    }

    /// Locks out the id range this run is about to claim: fetches the next
    /// value of each sequence, then advances the sequences past the range in
    /// one transaction before any bulk load happens.
    fn reserve_online(&mut self) -> Result<ReservedIds, ApiDbError> {
        let bases = self.fetch_sequence_ids()?;
        let values = ReservedIds {
            changeset: bases.changeset + self.changesets.changesets_written() as i64,
            node: bases.node + self.stats.nodes_written as i64,
            way: bases.way + self.stats.ways_written as i64,
            relation: bases.relation + self.stats.relations_written as i64,
        };
        let sql = self.sequence_update_sql(&values);
        self.sections.ensure(section::SEQUENCE_UPDATES, "", false)?;
        self.sections.write(section::SEQUENCE_UPDATES, &sql)?;
        let reserved_sql = self.sections.read_back(section::SEQUENCE_UPDATES)?;

        info!("writing sequence id updates to the database");
        self.driver.exec_transactional(&reserved_sql)?;
        debug!("sequence updates written to the database");
        Ok(bases)
    }

    fn write_offline_sequence_updates(&mut self) -> Result<(), ApiDbError> {
        let start = self.reserved.unwrap_or_else(ReservedIds::unreserved);
        let values = ReservedIds {
            changeset: start.changeset + self.changesets.changesets_written() as i64 - 1,
            node: start.node + self.stats.nodes_written as i64 - 1,
            way: start.way + self.stats.ways_written as i64 - 1,
            relation: start.relation + self.stats.relations_written as i64 - 1,
        };
        let sql = self.sequence_update_sql(&values);
        self.sections.ensure(section::SEQUENCE_UPDATES, "", false)?;
        self.sections.write(section::SEQUENCE_UPDATES, &sql)?;
        Ok(())
    }

    /// `setval` statements for every sequence this run touched.  A changeset
    /// and at least one node are written by any successful run, so those two
    /// are always present; ways and relations only when data exists.
    fn sequence_update_sql(&self, values: &ReservedIds) -> String {
        let mut sql = String::new();
        sql.push_str(&db::setval_statement(SequenceKind::Changesets, values.changeset));
        sql.push_str(&db::setval_statement(SequenceKind::Nodes, values.node));
        if self.stats.ways_written > 0 {
            sql.push_str(&db::setval_statement(SequenceKind::Ways, values.way));
        }
        if self.stats.relations_written > 0 {
            sql.push_str(&db::setval_statement(SequenceKind::Relations, values.relation));
        }
        sql
    }

    fn log_stats(&self) {
        debug!("write stats:");
        debug!("  nodes written: {}", self.stats.nodes_written);
        debug!("  node tags written: {}", self.stats.node_tags_written);
        debug!("  ways written: {}", self.stats.ways_written);
        debug!("  way nodes written: {}", self.stats.way_nodes_written);
        debug!("  way tags written: {}", self.stats.way_tags_written);
        debug!("  relations written: {}", self.stats.relations_written);
        debug!("  relation members written: {}", self.stats.relation_members_written);
        debug!("  relation members unresolved: {}", self.stats.relation_members_unresolved);
        debug!("  relation tags written: {}", self.stats.relation_tags_written);
        debug!("  changesets written: {}", self.stats.changesets_written);
        debug!("  total records written: {}", self.stats.total_records());
    }
}

impl Drop for BulkWriter {
    fn drop(&mut self) {
        self.driver.close();
    }
}
