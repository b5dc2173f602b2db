//! String interning for schema names.
//!
//! Converts type and field names into cheap integer handles (`Symbol`).
//! Comparing two symbols is an integer comparison; the string is recovered with
//! [`Interner::resolve`].

use indexmap::IndexSet;

/// A lightweight handle to an interned string.
///
/// Symbols are ordered by insertion order, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// Raw index, for debugging and dense side tables.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Insertion-ordered string interner.
///
/// Backed by an `IndexSet`, so a symbol is simply the position of its string in the set.
/// An interner is filled while the schema graph is built and only read afterwards, which
/// makes it safe to share across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing symbol if it was seen before.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(index) = self.strings.get_index_of(s) {
            return Symbol(index as u32);
        }
        let (index, _) = self.strings.insert_full(s.into());
        Symbol(index as u32)
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.strings.get_index_of(s).map(|index| Symbol(index as u32))
    }

    /// Resolve a symbol back to its string.
    ///
    /// # Panics
    /// Panics if the symbol was not created by this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        match self.strings.get_index(sym.0 as usize) {
            Some(s) => &**s,
            None => panic!("symbol {} does not belong to this interner", sym.0),
        }
    }

    /// Try to resolve a symbol, returning `None` if it is foreign.
    #[inline]
    pub fn try_resolve(&self, sym: Symbol) -> Option<&str> {
        self.strings.get_index(sym.0 as usize).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over all interned strings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Symbol(i as u32), &**s))
    }
}
