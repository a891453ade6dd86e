//! # Property Paths
//!
//! A `PropertyPath` addresses a node in a Config or Form document, e.g.
//! `data.profile.age`, `data.code[1]` or `attributes[0].validators[2].field`.
//!
//! Paths are immutable values. Descending into a child returns a new path,
//! so sibling branches of a recursive traversal never share builder state.

use serde::{Serialize, Serializer};

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named property.
    Property(String),
    /// A zero-based position in a sequence.
    Index(usize),
}

/// Position of a node within a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    /// The empty path, addressing the document itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// The path of a named child.
    pub fn property(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Property(name.into()))
    }

    /// The path of a sequence element.
    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Returns `true` for the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments from the root down.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Property(name) if i == 0 => f.write_str(name)?,
                Segment::Property(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
