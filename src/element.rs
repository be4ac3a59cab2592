//! The map element model accepted by the writer.
//!
//! Source ids are the ids carried by the input stream; they may be negative
//! and are replaced by database-assigned ids during the write.  Tags are kept
//! as ordered pairs so that row output is deterministic for a given input.

use std::fmt;

pub type SourceId = i64;

pub type Tags = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    /// The capitalised literal stored in the `member_type` columns.
    pub fn member_type(self) -> &'static str {
        match self {
            ElementKind::Node => "Node",
            ElementKind::Way => "Way",
            ElementKind::Relation => "Relation",
        }
    }

    pub fn from_member_type(value: &str) -> Option<Self> {
        match value {
            "Node" => Some(ElementKind::Node),
            "Way" => Some(ElementKind::Way),
            "Relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: SourceId,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
}

impl Node {
    pub fn new(id: SourceId, lat: f64, lon: f64) -> Self {
        Node { id, lat, lon, tags: Tags::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: SourceId,
    pub nodes: Vec<SourceId>,
    pub tags: Tags,
}

impl Way {
    pub fn new(id: SourceId, nodes: Vec<SourceId>) -> Self {
        Way { id, nodes, tags: Tags::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationMember {
    pub kind: ElementKind,
    pub id: SourceId,
    pub role: String,
}

impl RelationMember {
    pub fn new(kind: ElementKind, id: SourceId, role: &str) -> Self {
        RelationMember { kind, id, role: role.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: SourceId,
    pub members: Vec<RelationMember>,
    pub tags: Tags,
}

impl Relation {
    pub fn new(id: SourceId, members: Vec<RelationMember>) -> Self {
        Relation { id, members, tags: Tags::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Node(_) => ElementKind::Node,
            Element::Way(_) => ElementKind::Way,
            Element::Relation(_) => ElementKind::Relation,
        }
    }

    pub fn id(&self) -> SourceId {
        match self {
            Element::Node(n) => n.id,
            Element::Way(w) => w.id,
            Element::Relation(r) => r.id,
        }
    }
}
