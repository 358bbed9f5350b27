//! Node labels and relationship types.
//!
//! Closed enumerations: every label or relationship name that reaches a
//! Cypher string comes from these types, never from record data.

/// Node label, assigned by collection identity or tree depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Conjunction,
    Group,
    Area,
}

impl Label {
    /// Every label managed by this service. No other writer may touch these.
    pub const ALL: [Label; 3] = [Label::Conjunction, Label::Group, Label::Area];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conjunction => "Conjunction",
            Self::Group => "Group",
            Self::Area => "Area",
        }
    }

    /// Label for a node at `depth` in the materialized tree. Depths past the
    /// last rank collapse onto it, so arbitrarily deep subtrees stay
    /// representable.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Conjunction,
            1 => Self::Group,
            _ => Self::Area,
        }
    }

    /// Label mirrored from a document-store collection, if managed.
    pub fn for_collection(collection: &str) -> Option<Self> {
        match collection {
            "conjunctions" => Some(Self::Conjunction),
            "groups" => Some(Self::Group),
            "areas" => Some(Self::Area),
            _ => None,
        }
    }

    /// The document-store collection mirrored into this label.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Conjunction => "conjunctions",
            Self::Group => "groups",
            Self::Area => "areas",
        }
    }

    /// Relationship type for an edge arriving at a child with this label.
    pub fn child_relation(&self) -> RelType {
        match self {
            Self::Group => RelType::HasGroup,
            Self::Area => RelType::HasArea,
            Self::Conjunction => RelType::HasChild,
        }
    }
}

/// Typed parent→child relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelType {
    HasGroup,
    HasArea,
    HasChild,
}

impl RelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasGroup => "HAS_GROUP",
            Self::HasArea => "HAS_AREA",
            Self::HasChild => "HAS_CHILD",
        }
    }
}
