/// Counters for everything a write run has emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub nodes_written: u64,
    pub node_tags_written: u64,
    pub ways_written: u64,
    pub way_nodes_written: u64,
    pub way_tags_written: u64,
    pub relations_written: u64,
    pub relation_members_written: u64,
    pub relation_members_unresolved: u64,
    pub relation_tags_written: u64,
    pub changesets_written: u64,
}

impl WriteStats {
    pub fn elements_written(&self) -> u64 {
        self.nodes_written + self.ways_written + self.relations_written
    }

    pub fn total_records(&self) -> u64 {
        self.nodes_written
            + self.node_tags_written
            + self.ways_written
            + self.way_nodes_written
            + self.way_tags_written
            + self.relations_written
            + self.relation_members_written
            + self.relation_tags_written
            + self.changesets_written
    }
}
