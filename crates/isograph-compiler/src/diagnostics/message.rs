use rowan::TextRange;

use crate::compile::SourceId;

/// Which stage of the pipeline a diagnostic belongs to.
///
/// `SchemaBuild` and `CyclicSelection` diagnostics abort the run; `Parse` diagnostics drop the
/// literal they occur in; `Resolution` diagnostics drop the field they occur in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Parse,
    SchemaBuild,
    Resolution,
    CyclicSelection,
}

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two parse diagnostics overlap, the higher-priority one suppresses the other.
/// Unclosed delimiters come first because everything after them cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Cascading structural errors
    UnclosedParen,
    UnclosedBracket,
    UnclosedBrace,

    // Something required is missing
    ExpectedDeclaration,
    ExpectedTo,
    ExpectedName,
    ExpectedTypeAnnotation,
    ExpectedValue,
    ExpectedSelectionSet,

    // Something is there that should not be
    UnexpectedToken,
    TrailingTokens,
    DuplicateResponseName,
    DuplicateArgument,
    DuplicateVariable,
    IntegerOutOfRange,

    // Schema construction
    DuplicateType,
    DuplicateField,
    UnknownType,
    InvalidTypeAnnotation,
    UnknownParentType,
    InvalidParentType,
    UnknownPointerTarget,
    UnknownRootType,

    // Selection resolution
    UnknownField,
    SelectionSetNotAllowed,
    SelectionSetRequired,
    UnknownArgument,
    MissingArgument,
    ArgumentTypeMismatch,
    UndeclaredVariable,
    InvalidVariableType,
    InvalidDefaultValue,
    ReservedVariable,
    UnknownDirective,
    DirectiveNotAllowed,
    DirectiveOnPointer,
    UnknownDirectiveArgument,
    DirectiveArgumentTypeMismatch,
    DirectiveArgumentNotConstant,
    DuplicateDirective,
    MutuallyExclusiveDirectives,
    LoadableRequired,
    LoadableRequiresId,
    PointerTargetRequiresId,
    InvalidEntrypoint,
    DuplicateEntrypoint,
    UnusedVariable,

    // Whole-program
    CyclicSelection,
}

impl DiagnosticKind {
    pub fn category(&self) -> DiagnosticCategory {
        use DiagnosticKind::*;
        match self {
            UnclosedParen | UnclosedBracket | UnclosedBrace | ExpectedDeclaration | ExpectedTo
            | ExpectedName | ExpectedTypeAnnotation | ExpectedValue | ExpectedSelectionSet
            | UnexpectedToken | TrailingTokens | DuplicateResponseName | DuplicateArgument
            | DuplicateVariable | IntegerOutOfRange => DiagnosticCategory::Parse,

            DuplicateType | DuplicateField | UnknownType | InvalidTypeAnnotation
            | UnknownParentType | InvalidParentType | UnknownPointerTarget | UnknownRootType => {
                DiagnosticCategory::SchemaBuild
            }

            CyclicSelection => DiagnosticCategory::CyclicSelection,

            _ => DiagnosticCategory::Resolution,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnusedVariable => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind suppresses `other` when spans overlap.
    ///
    /// Lower discriminant wins. Only parse diagnostics take part: resolution errors are
    /// independent findings and are always reported.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self.category() == DiagnosticCategory::Parse
            && other.category() == DiagnosticCategory::Parse
            && self < other
    }

    /// Whether this kind hides `other` when both start at the same offset.
    ///
    /// The missing piece explains the unclosed delimiter, so root causes win over structural
    /// errors regardless of priority.
    pub fn outranks_at_same_position(&self, other: &DiagnosticKind) -> bool {
        if self.is_structural_error() && other.is_root_cause_error() {
            return false;
        }
        if self.is_root_cause_error() && other.is_structural_error() {
            return true;
        }
        self.suppresses(other)
    }

    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedParen | Self::UnclosedBracket | Self::UnclosedBrace
        )
    }

    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedDeclaration
                | Self::ExpectedTo
                | Self::ExpectedName
                | Self::ExpectedTypeAnnotation
                | Self::ExpectedValue
                | Self::ExpectedSelectionSet
        )
    }

    /// Hint attached to every diagnostic of this kind.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedDeclaration => {
                Some("e.g., `field User.avatar { url }` or `entrypoint Query.HomePage`")
            }
            Self::ExpectedTo => Some("e.g., `pointer User.bestFriend to User { ... }`"),
            Self::MutuallyExclusiveDirectives => Some("keep only one of the two directives"),
            Self::LoadableRequired => Some("select it as `field @loadable`"),
            Self::ReservedVariable => Some("rename it; refetch queries bind `$id` to the refetched record"),
            Self::DirectiveArgumentNotConstant => {
                Some("directive arguments shape the artifact and must be literals")
            }
            Self::CyclicSelection => {
                Some("add `@loadable` to one selection in the cycle to defer it")
            }
            _ => None,
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedParen => "missing closing `)`",
            Self::UnclosedBracket => "missing closing `]`",
            Self::UnclosedBrace => "missing closing `}`",

            Self::ExpectedDeclaration => "expected `field`, `pointer` or `entrypoint`",
            Self::ExpectedTo => "expected `to`",
            Self::ExpectedName => "expected a name",
            Self::ExpectedTypeAnnotation => "expected a type annotation",
            Self::ExpectedValue => "expected a value",
            Self::ExpectedSelectionSet => "expected a selection set",

            Self::UnexpectedToken => "unexpected token",
            Self::TrailingTokens => "unexpected tokens after the declaration",
            Self::DuplicateResponseName => "duplicate response name in selection set",
            Self::DuplicateArgument => "duplicate argument",
            Self::DuplicateVariable => "duplicate variable definition",
            Self::IntegerOutOfRange => "integer literal out of range",

            Self::DuplicateType => "duplicate type",
            Self::DuplicateField => "duplicate field",
            Self::UnknownType => "unknown type",
            Self::InvalidTypeAnnotation => "invalid type annotation",
            Self::UnknownParentType => "field declared on an unknown type",
            Self::InvalidParentType => "fields can only be declared on object, interface or union types",
            Self::UnknownPointerTarget => "pointer target type does not exist",
            Self::UnknownRootType => "root operation type does not exist",

            Self::UnknownField => "unknown field",
            Self::SelectionSetNotAllowed => "field cannot have a selection set",
            Self::SelectionSetRequired => "field requires a selection set",
            Self::UnknownArgument => "unknown argument",
            Self::MissingArgument => "missing required argument",
            Self::ArgumentTypeMismatch => "argument type mismatch",
            Self::UndeclaredVariable => "undeclared variable",
            Self::InvalidVariableType => "variable type must be an input type",
            Self::InvalidDefaultValue => "default value does not match the variable type",
            Self::ReservedVariable => "variable name is reserved",
            Self::UnknownDirective => "unknown directive",
            Self::DirectiveNotAllowed => "directive is not allowed here",
            Self::DirectiveOnPointer => "directives are not allowed on pointer declarations",
            Self::UnknownDirectiveArgument => "unknown directive argument",
            Self::DirectiveArgumentTypeMismatch => "directive argument type mismatch",
            Self::DirectiveArgumentNotConstant => "directive arguments must be constants",
            Self::DuplicateDirective => "duplicate directive",
            Self::MutuallyExclusiveDirectives => "directives cannot be used together",
            Self::LoadableRequired => "field must be selected with `@loadable`",
            Self::LoadableRequiresId => "`@loadable` requires a refetchable parent type",
            Self::PointerTargetRequiresId => "pointer target type has no `id` field",
            Self::InvalidEntrypoint => "invalid entrypoint",
            Self::DuplicateEntrypoint => "duplicate entrypoint",
            Self::UnusedVariable => "unused variable",

            Self::CyclicSelection => "cyclic selection",
        }
    }

    /// Template for custom messages. Contains a `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnclosedParen | Self::UnclosedBracket | Self::UnclosedBrace => {
                format!("{}; {{}}", self.fallback_message())
            }
            // Parser messages already spell out what was expected and what was found.
            Self::ExpectedDeclaration
            | Self::ExpectedTo
            | Self::ExpectedName
            | Self::ExpectedTypeAnnotation
            | Self::ExpectedValue
            | Self::ExpectedSelectionSet
            | Self::UnexpectedToken
            | Self::TrailingTokens
            | Self::DirectiveNotAllowed => "{}".to_string(),
            Self::DuplicateResponseName => "`{}` is selected twice in this selection set".to_string(),
            Self::DuplicateArgument => "argument `{}` is provided twice".to_string(),
            Self::DuplicateVariable => "variable `${}` is defined twice".to_string(),
            Self::DuplicateType => "type `{}` is defined twice".to_string(),
            Self::DuplicateField => "field `{}` is defined twice".to_string(),
            Self::UnknownType => "type `{}` does not exist".to_string(),
            Self::UnknownParentType => "cannot declare `{}`: the type does not exist".to_string(),
            Self::UnknownField => "`{}` is not a field".to_string(),
            Self::UnknownArgument => "`{}` is not an argument of this field".to_string(),
            Self::MissingArgument => "missing required argument `{}`".to_string(),
            Self::UndeclaredVariable => "variable `${}` is not declared".to_string(),
            Self::ReservedVariable => "variable `${}` is reserved for refetch queries".to_string(),
            Self::UnknownDirective => "unknown directive `@{}`".to_string(),
            Self::DirectiveOnPointer => {
                "`@{}` is not allowed on a pointer declaration".to_string()
            }
            Self::UnknownDirectiveArgument => "`{}` is not an argument of this directive".to_string(),
            Self::DuplicateDirective => "`@{}` is applied twice".to_string(),
            Self::MutuallyExclusiveDirectives => "{} cannot be used together".to_string(),
            Self::UnusedVariable => "variable `${}` is never used".to_string(),
            Self::DuplicateEntrypoint => "`{}` is declared as an entrypoint twice".to_string(),
            Self::CyclicSelection => "cyclic selection: {}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → `fallback_message()`
    /// - `Some(detail)` → `custom_message()` with `{}` replaced by `detail`
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A range inside one registered literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub source: SourceId,
    pub range: TextRange,
}

impl Span {
    pub fn new(source: SourceId, range: TextRange) -> Self {
        Self { source, range }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// `None` for problems that have no place in a literal (schema document, cycle summary).
    pub(crate) span: Option<Span>,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
            hints: kind.default_hint().map(str::to_string).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{} at {}..{}: {}",
                self.severity(),
                u32::from(span.range.start()),
                u32::from(span.range.end()),
                self.message
            )?,
            None => write!(f, "{}: {}", self.severity(), self.message)?,
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.span.range.start()),
                u32::from(related.span.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
