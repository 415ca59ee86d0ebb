// src/crawl/path.rs
// =============================================================================
// PathItem: the chain of links from the crawl's source to the page being
// processed right now.
//
// A PathItem is immutable. extend() returns a NEW PathItem that points back
// at the old one, so every child path found on a page shares the parent's
// prefix instead of copying it. Many workers can hold extensions of the same
// prefix at once without ever seeing each other's changes.
//
//   root("/A")            [/A]
//     .extend("/B")       [/A, /B]      (shares /A)
//     .extend("/C")       [/A, /B, /C]  (shares /A, /B)
// =============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

struct Segment {
    link: String,
    parent: Option<Arc<Segment>>,
}

#[derive(Clone)]
pub struct PathItem {
    tail: Arc<Segment>,
    len: usize,
}

impl PathItem {
    /// A one-segment path holding only the source
    pub fn root(source: impl Into<String>) -> Self {
        Self {
            tail: Arc::new(Segment {
                link: source.into(),
                parent: None,
            }),
            len: 1,
        }
    }

    /// Returns `self` plus one more segment; `self` is left untouched
    pub fn extend(&self, link: impl Into<String>) -> Self {
        Self {
            tail: Arc::new(Segment {
                link: link.into(),
                parent: Some(Arc::clone(&self.tail)),
            }),
            len: self.len + 1,
        }
    }

    /// The node currently being processed (what gets fetched)
    pub fn last(&self) -> &str {
        &self.tail.link
    }

    /// The crawl's source
    #[cfg(test)]
    pub fn first(&self) -> &str {
        let mut segment = &self.tail;
        while let Some(parent) = &segment.parent {
            segment = parent;
        }
        &segment.link
    }

    /// Number of segments, always >= 1
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of links followed to get here
    pub fn hops(&self) -> usize {
        self.len - 1
    }

    /// Segments in source -> current order
    pub fn segments(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.len);
        let mut segment = Some(&self.tail);
        while let Some(s) = segment {
            out.push(s.link.as_str());
            segment = s.parent.as_ref();
        }
        out.reverse();
        out
    }
}

impl fmt::Debug for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.segments()).finish()
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join(" -> "))
    }
}

impl PartialEq for PathItem {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.segments() == other.segments()
    }
}

impl Eq for PathItem {}

// Serialized as a plain JSON array of links
impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.segments())
    }
}

// Long chains would otherwise drop recursively, one stack frame per segment
impl Drop for Segment {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(segment) = parent {
            match Arc::try_unwrap(segment) {
                Ok(mut owned) => parent = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}
