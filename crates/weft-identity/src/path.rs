// src/path.rs
//
// PathStep and Path: addressing positions inside compound values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::{Identifier, IdentifierError};

/// One level of addressing inside a compound value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    /// A record field.
    Field(Identifier),
    /// An array entry, tuple element or other positional child.
    Index(usize),
}

impl PathStep {
    pub fn field(id: Identifier) -> Self {
        PathStep::Field(id)
    }

    pub fn index(i: usize) -> Self {
        PathStep::Index(i)
    }

    pub fn as_field(&self) -> Option<&Identifier> {
        match self {
            PathStep::Field(id) => Some(id),
            PathStep::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(i) => Some(*i),
            PathStep::Field(_) => None,
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self, PathStep::Field(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathStep::Index(_))
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Field(id) => write!(f, "{id}"),
            PathStep::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl FromStr for PathStep {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return inner
                .parse()
                .map(PathStep::Index)
                .map_err(|_| IdentifierError::InvalidStep {
                    text: s.to_string(),
                });
        }
        s.parse().map(PathStep::Field)
    }
}

impl From<Identifier> for PathStep {
    fn from(id: Identifier) -> Self {
        PathStep::Field(id)
    }
}

impl From<usize> for PathStep {
    fn from(i: usize) -> Self {
        PathStep::Index(i)
    }
}

/// A sequence of steps from a value tree root to a position inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    steps: SmallVec<[PathStep; 4]>,
}

impl Path {
    /// The empty path, addressing the root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// A new path extended by one step.
    pub fn join(&self, step: PathStep) -> Path {
        let mut out = self.clone();
        out.push(step);
        out
    }

    /// The first `len` steps of this path.
    pub fn prefix(&self, len: usize) -> Path {
        self.steps.iter().take(len).cloned().collect()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathStep> {
        self.steps.iter()
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.steps.starts_with(&other.steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str(".");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = IdentifierError;

    /// Parse `a/[2]/b`. Both `""` and `"."` denote the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "." {
            return Ok(Path::root());
        }
        s.split('/').map(str::parse::<PathStep>).collect()
    }
}

impl FromIterator<PathStep> for Path {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Path {
            steps: iter.into_iter().collect(),
        }
    }
}

impl Extend<PathStep> for Path {
    fn extend<I: IntoIterator<Item = PathStep>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        steps.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathStep;
    type IntoIter = std::slice::Iter<'a, PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    #[test]
    fn display_and_parse() {
        let path: Path = vec![
            PathStep::Field(id("points")),
            PathStep::Index(2),
            PathStep::Field(id("x")),
        ]
        .into();
        assert_eq!(path.to_string(), "points/[2]/x");
        assert_eq!("points/[2]/x".parse::<Path>().unwrap(), path);
    }

    #[test]
    fn root_path() {
        assert_eq!(Path::root().to_string(), ".");
        assert!(".".parse::<Path>().unwrap().is_empty());
        assert!("".parse::<Path>().unwrap().is_empty());
    }

    #[test]
    fn bad_index_step() {
        assert!(matches!(
            "[x]".parse::<PathStep>(),
            Err(IdentifierError::InvalidStep { .. })
        ));
    }

    #[test]
    fn prefix_and_starts_with() {
        let path: Path = "a/b/[0]".parse().unwrap();
        let prefix = path.prefix(2);
        assert_eq!(prefix.to_string(), "a/b");
        assert!(path.starts_with(&prefix));
        assert!(!prefix.starts_with(&path));
    }
}
