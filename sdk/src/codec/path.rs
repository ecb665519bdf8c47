//! Field paths for diagnostics.

use std::fmt;

#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Location of the value currently being encoded or decoded, e.g.
/// `data.creators[1].share`.
#[derive(Debug, Clone, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Empty path (the root value).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub(crate) fn push_field(&mut self, name: &str) {
        self.segments.push(Segment::Field(name.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let mut path = FieldPath::root();
        assert_eq!(path.to_string(), "<root>");
        path.push_field("data");
        path.push_field("creators");
        path.push_index(1);
        path.push_field("share");
        assert_eq!(path.to_string(), "data.creators[1].share");
        path.pop();
        path.pop();
        assert_eq!(path.to_string(), "data.creators");
    }
}
