//! Registry of the iso literals taking part in one compilation run.
//!
//! The excluded source-rewriting layer extracts literals from host files and registers each one
//! here; diagnostics refer back to them through [`SourceId`].

/// Handle to one registered literal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct SourceId(pub(crate) u32);

impl SourceId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Where a literal came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// A literal passed directly as a string (tests, tooling).
    Inline,
    /// A literal extracted from a host file.
    File(String),
}

impl SourceKind {
    pub fn display_name(&self) -> &str {
        match self {
            SourceKind::Inline => "<iso>",
            SourceKind::File(path) => path,
        }
    }
}

/// A borrowed view of a registered literal.
#[derive(Clone, Copy, Debug)]
pub struct Source<'a> {
    pub id: SourceId,
    pub kind: &'a SourceKind,
    pub content: &'a str,
}

#[derive(Clone, Debug)]
struct SourceEntry {
    kind: SourceKind,
    content: String,
}

#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inline(&mut self, content: &str) -> SourceId {
        self.push_entry(SourceKind::Inline, content)
    }

    pub fn add_file(&mut self, path: &str, content: &str) -> SourceId {
        self.push_entry(SourceKind::File(path.to_owned()), content)
    }

    /// Map holding the given literals in order.
    pub fn from_literals<'s>(literals: impl IntoIterator<Item = &'s str>) -> Self {
        let mut map = Self::new();
        for literal in literals {
            map.add_inline(literal);
        }
        map
    }

    pub fn get(&self, id: SourceId) -> Option<Source<'_>> {
        self.entries.get(id.0 as usize).map(|entry| Source {
            id,
            kind: &entry.kind,
            content: &entry.content,
        })
    }

    pub fn content(&self, id: SourceId) -> Option<&str> {
        self.get(id).map(|s| s.content)
    }

    /// The file path if this literal came from a file.
    pub fn path(&self, id: SourceId) -> Option<&str> {
        match self.get(id)?.kind {
            SourceKind::File(path) => Some(path),
            SourceKind::Inline => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Source<'_>> {
        self.entries.iter().enumerate().map(|(idx, entry)| Source {
            id: SourceId(idx as u32),
            kind: &entry.kind,
            content: &entry.content,
        })
    }

    fn push_entry(&mut self, kind: SourceKind, content: &str) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        self.entries.push(SourceEntry {
            kind,
            content: content.to_owned(),
        });
        id
    }
}
