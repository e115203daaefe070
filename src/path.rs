//! Composite keys addressing values in the remote scene store.
//!
//! A [`Path`] is an ordered list of [`Segment`]s. On the wire a path is a JSON
//! array of strings and integers (`["root", "gameObjects", 3]`), and in a URL it
//! is the segments joined with `/`. Slices use the literal `start:end` notation
//! of the store, e.g. `root/gameObjects/2:5` or `root/gameObjects/:/physics`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One leg of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSegment", into = "RawSegment")]
pub enum Segment {
    /// Object field name.
    Key(String),
    /// Array element.
    Index(usize),
    /// Contiguous array range. Open bounds run to the start or end of the array.
    Slice {
        start: Option<usize>,
        end: Option<usize>,
    },
}

impl Segment {
    /// The slice covering every element, written `:`.
    pub const ALL: Segment = Segment::Slice {
        start: None,
        end: None,
    };

    /// Slice `start:end`.
    pub fn range(start: usize, end: usize) -> Self {
        Segment::Slice {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Slice `start:`, running to the end of the array.
    pub fn from_index(start: usize) -> Self {
        Segment::Slice {
            start: Some(start),
            end: None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Parses the textual form used in URLs. Digits become an index, anything
    /// containing a colon becomes a slice, the rest is a key.
    pub fn parse(text: &str) -> Self {
        if let Some((start, end)) = text.split_once(':') {
            let start = start.parse().ok();
            let end = end.parse().ok();
            return Segment::Slice { start, end };
        }
        match text.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(text.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
            Segment::Slice { start, end } => {
                if let Some(s) = start {
                    write!(f, "{s}")?;
                }
                f.write_str(":")?;
                if let Some(e) = end {
                    write!(f, "{e}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Wire form: integers stay integers, keys and slices are strings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSegment {
    Index(usize),
    Text(String),
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        match raw {
            RawSegment::Index(i) => Segment::Index(i),
            RawSegment::Text(t) if t.contains(':') => Segment::parse(&t),
            RawSegment::Text(t) => Segment::Key(t),
        }
    }
}

impl From<Segment> for RawSegment {
    fn from(segment: Segment) -> Self {
        match segment {
            Segment::Index(i) => RawSegment::Index(i),
            Segment::Key(k) => RawSegment::Text(k),
            slice @ Segment::Slice { .. } => RawSegment::Text(slice.to_string()),
        }
    }
}

/// Ordered sequence of segments. Equality is segment-wise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    /// Returns a copy of this path extended by one segment.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Returns a copy of this path extended by every segment of `tail`.
    pub fn join(&self, tail: &Path) -> Self {
        let mut path = self.clone();
        path.0.extend(tail.0.iter().cloned());
        path
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Parses a `/`-separated path such as `root/gameObjects/0`.
    pub fn parse(text: &str) -> Self {
        text.split('/')
            .filter(|leg| !leg.is_empty())
            .map(Segment::parse)
            .collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path(segments)
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Builds a [`Path`] from a list of keys and indices.
///
/// ```
/// use scene_driver::{path, Path};
/// let p: Path = path!["root", "gameObjects", 3];
/// assert_eq!(p.to_string(), "root/gameObjects/3");
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::path::Path::new() };
    ($($segment:expr),+ $(,)?) => {
        $crate::path::Path::from(vec![$($crate::path::Segment::from($segment)),+])
    };
}
