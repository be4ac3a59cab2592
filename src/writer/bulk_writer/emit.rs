// Translation of elements into per-table bulk-copy rows
use log::debug;

use crate::clock::format_timestamp;
use crate::copy::escape::escape;
use crate::element::{ElementKind, Node, Relation, Way};
use crate::error::ApiDbError;
use crate::tile;
use crate::unresolved::PendingMember;

use super::BulkWriter;

const NODE_SECTIONS: [&str; 4] = ["current_nodes", "current_node_tags", "nodes", "node_tags"];
const WAY_SECTIONS: [&str; 6] = [
    "current_ways",
    "current_way_tags",
    "current_way_nodes",
    "ways",
    "way_tags",
    "way_nodes",
];
const RELATION_SECTIONS: [&str; 6] = [
    "current_relations",
    "current_relation_tags",
    "current_relation_members",
    "relations",
    "relation_tags",
    "relation_members",
];

impl BulkWriter {
    /// Writes one node: a snapshot row, a version-1 history row, tags, and
    /// any relation member rows that were waiting for this node.
    pub fn write_node(&mut self, node: &Node) -> Result<(), ApiDbError> {
        if self.stats.nodes_written == 0 {
            for table in NODE_SECTIONS {
                self.sections.ensure_copy(table)?;
            }
        }

        let local_id = self.ids.assign(ElementKind::Node, node.id)?;
        let lat = tile::scale_latitude(node.lat)?;
        let lon = tile::scale_longitude(node.lon)?;
        let tile = tile::tile_for_point(node.lat, node.lon);

        // The changeset bounds are the combined bounds of the nodes written
        // into it; grow them before the rows go out.
        self.changesets.expand_bbox(node.lon, node.lat);

        let changeset_id = self.changesets.current_id();
        let timestamp = self.now();
        self.sections.write(
            "current_nodes",
            &format!("{local_id}\t{lat}\t{lon}\t{changeset_id}\tt\t{timestamp}\t{tile}\t1\n"),
        )?;
        self.sections.write(
            "nodes",
            &format!("{local_id}\t{lat}\t{lon}\t{changeset_id}\tt\t{timestamp}\t{tile}\t1\t\\N\n"),
        )?;
        self.write_tags(local_id, &node.tags, "current_node_tags", "node_tags")?;
        self.stats.nodes_written += 1;
        self.stats.node_tags_written += node.tags.len() as u64;

        self.bump_changeset()?;
        self.resolve_pending(ElementKind::Node, node.id, local_id)?;

        if self.status_due(self.stats.nodes_written) {
            debug!("parsed {} nodes", self.stats.nodes_written);
        }
        Ok(())
    }

    /// Writes one way.  Every referenced node must already have a local id;
    /// a reference to an unknown node is fatal.
    pub fn write_way(&mut self, way: &Way) -> Result<(), ApiDbError> {
        if self.stats.ways_written == 0 {
            for table in WAY_SECTIONS {
                self.sections.ensure_copy(table)?;
            }
        }

        let local_id = self.ids.assign(ElementKind::Way, way.id)?;
        let changeset_id = self.changesets.current_id();
        let timestamp = self.now();
        self.sections.write(
            "current_ways",
            &format!("{local_id}\t{changeset_id}\t{timestamp}\tt\t1\n"),
        )?;
        self.sections.write(
            "ways",
            &format!("{local_id}\t{changeset_id}\t{timestamp}\t1\tt\t\\N\n"),
        )?;

        for (index, node_id) in way.nodes.iter().enumerate() {
            let sequence_id = index + 1;
            let node_local = self.ids.resolve(ElementKind::Node, *node_id).ok_or(
                ApiDbError::UnresolvedWayNode { way_id: way.id, node_id: *node_id },
            )?;
            self.sections.write(
                "current_way_nodes",
                &format!("{local_id}\t{node_local}\t{sequence_id}\n"),
            )?;
            self.sections.write(
                "way_nodes",
                &format!("{local_id}\t{node_local}\t1\t{sequence_id}\n"),
            )?;
            self.stats.way_nodes_written += 1;
        }

        self.write_tags(local_id, &way.tags, "current_way_tags", "way_tags")?;
        self.stats.ways_written += 1;
        self.stats.way_tags_written += way.tags.len() as u64;

        self.bump_changeset()?;
        self.resolve_pending(ElementKind::Way, way.id, local_id)?;

        if self.status_due(self.stats.ways_written) {
            debug!("parsed {} ways", self.stats.ways_written);
        }
        Ok(())
    }

    /// Writes one relation.  Members whose target is already known get their
    /// rows now; the rest are parked until the target arrives.
    pub fn write_relation(&mut self, relation: &Relation) -> Result<(), ApiDbError> {
        if self.stats.relations_written == 0 {
            for table in RELATION_SECTIONS {
                self.sections.ensure_copy(table)?;
            }
        }

        let local_id = self.ids.assign(ElementKind::Relation, relation.id)?;
        let changeset_id = self.changesets.current_id();
        let timestamp = self.now();
        self.sections.write(
            "current_relations",
            &format!("{local_id}\t{changeset_id}\t{timestamp}\tt\t1\n"),
        )?;
        self.sections.write(
            "relations",
            &format!("{local_id}\t{changeset_id}\t{timestamp}\t1\tt\t\\N\n"),
        )?;

        for (index, member) in relation.members.iter().enumerate() {
            let sequence_index = index + 1;
            match self.ids.resolve(member.kind, member.id) {
                Some(member_local) => {
                    self.emit_relation_member(
                        local_id,
                        member.kind,
                        member_local,
                        &member.role,
                        sequence_index,
                    )?;
                }
                None => {
                    self.unresolved.record(
                        member.kind,
                        member.id,
                        PendingMember {
                            relation_source_id: relation.id,
                            relation_local_id: local_id,
                            role: member.role.clone(),
                            sequence_index,
                        },
                    );
                }
            }
        }

        self.write_tags(local_id, &relation.tags, "current_relation_tags", "relation_tags")?;
        self.stats.relations_written += 1;
        self.stats.relation_tags_written += relation.tags.len() as u64;

        self.bump_changeset()?;
        self.resolve_pending(ElementKind::Relation, relation.id, local_id)?;

        if self.status_due(self.stats.relations_written) {
            debug!("parsed {} relations", self.stats.relations_written);
        }
        Ok(())
    }

    fn write_tags(
        &mut self,
        local_id: i64,
        tags: &[(String, String)],
        current_table: &str,
        history_table: &str,
    ) -> Result<(), ApiDbError> {
        for (key, value) in tags {
            let key = escape(key);
            let value = escape(value);
            self.sections.write(current_table, &format!("{local_id}\t{key}\t{value}\n"))?;
            self.sections.write(history_table, &format!("{local_id}\t1\t{key}\t{value}\n"))?;
        }
        Ok(())
    }

    fn emit_relation_member(
        &mut self,
        relation_local_id: i64,
        member_kind: ElementKind,
        member_local_id: i64,
        role: &str,
        sequence_index: usize,
    ) -> Result<(), ApiDbError> {
        let member_type = member_kind.member_type();
        let role = escape(role);
        self.sections.write(
            "current_relation_members",
            &format!("{relation_local_id}\t{member_type}\t{member_local_id}\t{role}\t{sequence_index}\n"),
        )?;
        self.sections.write(
            "relation_members",
            &format!("{relation_local_id}\t{member_type}\t{member_local_id}\t{role}\t1\t{sequence_index}\n"),
        )?;
        self.stats.relation_members_written += 1;
        Ok(())
    }

    /// Emits the member rows of every relation that was waiting for this
    /// element, now that its local id exists.
    fn resolve_pending(
        &mut self,
        kind: ElementKind,
        source_id: i64,
        local_id: i64,
    ) -> Result<(), ApiDbError> {
        for pending in self.unresolved.take(kind, source_id) {
            debug!(
                "relation {} has a deferred reference to {kind} {source_id}; resolving",
                pending.relation_source_id
            );
            self.emit_relation_member(
                pending.relation_local_id,
                kind,
                local_id,
                &pending.role,
                pending.sequence_index,
            )?;
        }
        Ok(())
    }

    /// Counts one change against the current changeset; a full changeset is
    /// flushed and rotated out.
    fn bump_changeset(&mut self) -> Result<(), ApiDbError> {
        self.changesets.increment();
        if self.changesets.changes_in_current() >= self.config.max_changes_per_changeset {
            self.flush_changeset_row()?;
            self.changesets.rotate();
            debug!("parsed {} changesets", self.changesets.changesets_written());
        }
        Ok(())
    }

    pub(super) fn flush_changeset_row(&mut self) -> Result<(), ApiDbError> {
        let user_id = self.changesets.user_id();
        if user_id < 0 {
            return Err(ApiDbError::InvalidUserId(user_id));
        }

        self.sections.ensure_copy("changesets")?;
        let id = self.changesets.current_id();
        let (min_lat, max_lat, min_lon, max_lon) = self.changesets.bbox().scaled();
        let changes = self.changesets.changes_in_current();
        let timestamp = self.now();
        self.sections.write(
            "changesets",
            &format!(
                "{id}\t{user_id}\t{timestamp}\t{min_lat}\t{max_lat}\t{min_lon}\t{max_lon}\t{timestamp}\t{changes}\n"
            ),
        )
    }

    fn status_due(&self, count: u64) -> bool {
        self.config.status_update_interval > 0 && count % self.config.status_update_interval == 0
    }

    fn now(&self) -> String {
        format_timestamp(self.clock.now_utc())
    }
}
