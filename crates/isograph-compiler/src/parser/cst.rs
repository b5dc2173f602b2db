//! Syntax kinds for iso literals.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds (from parser).
//! Logos derives token recognition; node kinds and contextual keywords lack token/regex
//! attributes. `IsoLang` implements Rowan's `Language` trait for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[token("$")]
    Dollar,

    #[token("=")]
    Equals,

    /// Non-null marker in type annotations.
    #[token("!")]
    Bang,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    StringValue,

    #[regex(r#""""(?:[^"]|"[^"]|""[^"])*""""#)]
    BlockStringValue,

    #[regex(r"-?(?:0|[1-9][0-9]*)")]
    IntValue,

    #[regex(r"-?(?:0|[1-9][0-9]*)\.[0-9]+(?:[eE][+-]?[0-9]+)?")]
    #[regex(r"-?(?:0|[1-9][0-9]*)[eE][+-]?[0-9]+")]
    FloatValue,

    /// Identifier. Keywords are lexed as identifiers and re-tagged by the parser.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    // Contextual keywords, produced only by the parser
    KwField,
    KwPointer,
    KwEntrypoint,
    KwTo,
    KwTrue,
    KwFalse,
    KwNull,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    LineComment,

    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    FieldDecl,
    PointerDecl,
    EntrypointDecl,
    DeclTarget,
    VariableDefs,
    VariableDef,
    Variable,
    NamedType,
    ListType,
    NonNullType,
    Description,
    SelectionSet,
    Selection,
    Alias,
    Arguments,
    Argument,
    Directive,
    Literal,
    ListValue,
    ObjectValue,
    ObjectField,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsoLang {}

impl Language for IsoLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<IsoLang>;
pub type SyntaxToken = rowan::SyntaxToken<IsoLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
        TokenSet(1 << kind)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                // SAFETY: bounds checked against `__LAST` above
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of a value. Keywords `true`/`false`/`null` arrive as `Id`.
    pub const VALUE_FIRST: TokenSet = TokenSet::new(&[
        Dollar,
        StringValue,
        BlockStringValue,
        IntValue,
        FloatValue,
        Id,
        BracketOpen,
        BraceOpen,
    ]);

    pub const TYPE_FIRST: TokenSet = TokenSet::new(&[Id, BracketOpen]);

    pub const DESCRIPTION: TokenSet = TokenSet::new(&[StringValue, BlockStringValue]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace, Newline, LineComment]);

    /// Where a broken selection stops swallowing tokens.
    pub const SELECTION_RECOVERY: TokenSet = TokenSet::new(&[BraceClose, BraceOpen, Id]);

    pub const ARGUMENT_RECOVERY: TokenSet = TokenSet::new(&[ParenClose, Id, BraceOpen, BraceClose]);

    pub const VARIABLE_DEF_RECOVERY: TokenSet =
        TokenSet::new(&[ParenClose, Dollar, BraceOpen, At]);

    pub const VALUE_RECOVERY: TokenSet =
        TokenSet::new(&[ParenClose, BracketClose, BraceClose, Comma]);

    /// Tokens that may follow a declaration header.
    pub const HEADER_RECOVERY: TokenSet =
        TokenSet::new(&[ParenOpen, At, BraceOpen, StringValue, BlockStringValue]);
}
