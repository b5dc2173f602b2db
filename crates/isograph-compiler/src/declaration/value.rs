use std::fmt;
use std::str::FromStr;

/// Argument and default values.
///
/// Floats keep their source text so that values stay `Eq + Ord` and print exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(String),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn is_constant(&self) -> bool {
        match self {
            Value::Variable(_) => false,
            Value::List(items) => items.iter().all(Value::is_constant),
            Value::Object(fields) => fields.iter().all(|(_, v)| v.is_constant()),
            _ => true,
        }
    }

    /// Names of all variables referenced anywhere inside this value, in order.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Variable(name) => out.push(name),
            Value::List(items) => items.iter().for_each(|v| v.collect_variables(out)),
            Value::Object(fields) => fields.iter().for_each(|(_, v)| v.collect_variables(out)),
            _ => {}
        }
    }

    /// Replace every variable using `lookup`. Variables without a replacement are kept.
    pub fn substitute(&self, lookup: &impl Fn(&str) -> Option<Value>) -> Value {
        match self {
            Value::Variable(name) => lookup(name).unwrap_or_else(|| self.clone()),
            Value::List(items) => Value::List(items.iter().map(|v| v.substitute(lookup)).collect()),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.substitute(lookup)))
                    .collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Fragment of a response alias that identifies this value.
    ///
    /// Every chunk starts with a one-letter tag and free text goes through [`escape_alias_text`],
    /// so distinct values never share a chunk.
    pub fn alias_chunk(&self) -> String {
        match self {
            Value::Variable(name) => format!("v_{}", escape_alias_text(name)),
            // `l` marks plain literals
            Value::Int(i) => format!("l_{}", escape_alias_text(&i.to_string())),
            Value::Float(f) => format!("l_{}", escape_alias_text(f)),
            Value::Boolean(b) => format!("l_{}", b),
            Value::Null => "l_null".to_string(),
            Value::String(s) => format!("s_{}", escape_alias_text(s)),
            Value::Enum(e) => format!("e_{}", escape_alias_text(e)),
            Value::List(items) => format!(
                "a_{}_a",
                items
                    .iter()
                    .map(Value::alias_chunk)
                    .collect::<Vec<_>>()
                    .join("_")
            ),
            Value::Object(fields) => format!(
                "o_{}_c",
                fields
                    .iter()
                    .map(|(k, v)| format!("{}__{}", escape_alias_text(k), v.alias_chunk()))
                    .collect::<Vec<_>>()
                    .join("_")
            ),
        }
    }
}

/// Alias-safe spelling of arbitrary text.
///
/// ASCII letters and digits are kept and every other byte, `_` included, becomes `_xHH_`. The
/// output never contains a bare `_`, which is what keeps the `_`-separated chunk structure of a
/// store key unambiguous.
pub fn escape_alias_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("_x{:02X}_", byte));
        }
    }
    out
}

/// GraphQL syntax, as printed into query text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${}", name),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(s) => write!(f, "{}", s),
            Value::String(s) => write_quoted(f, s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Enum(e) => write!(f, "{}", e),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

/// `Name`, `[T]` and `T!`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeAnnotation {
    Named(String),
    List(Box<TypeAnnotation>),
    NonNull(Box<TypeAnnotation>),
}

impl TypeAnnotation {
    pub fn named(name: impl Into<String>) -> Self {
        TypeAnnotation::Named(name.into())
    }

    pub fn non_null(inner: TypeAnnotation) -> Self {
        match inner {
            TypeAnnotation::NonNull(_) => inner,
            other => TypeAnnotation::NonNull(Box::new(other)),
        }
    }

    pub fn list(item: TypeAnnotation) -> Self {
        TypeAnnotation::List(Box::new(item))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeAnnotation::NonNull(_))
    }

    /// This type with an outer `!` removed.
    pub fn nullable(&self) -> &TypeAnnotation {
        match self {
            TypeAnnotation::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Item type when this is a (possibly non-null) list.
    pub fn list_item(&self) -> Option<&TypeAnnotation> {
        match self.nullable() {
            TypeAnnotation::List(item) => Some(item),
            _ => None,
        }
    }

    /// The innermost named type.
    pub fn inner_name(&self) -> &str {
        match self {
            TypeAnnotation::Named(name) => name,
            TypeAnnotation::List(inner) | TypeAnnotation::NonNull(inner) => inner.inner_name(),
        }
    }

    /// Whether a value of type `self` may be passed where `expected` is required.
    ///
    /// `T!` satisfies `T`; list nesting must match.
    pub fn satisfies(&self, expected: &TypeAnnotation) -> bool {
        match (self, expected) {
            (TypeAnnotation::NonNull(a), TypeAnnotation::NonNull(b)) => a.satisfies(b),
            (TypeAnnotation::NonNull(a), b) => a.satisfies(b),
            (_, TypeAnnotation::NonNull(_)) => false,
            (TypeAnnotation::List(a), TypeAnnotation::List(b)) => a.satisfies(b),
            (TypeAnnotation::Named(a), TypeAnnotation::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Named(name) => write!(f, "{}", name),
            TypeAnnotation::List(inner) => write!(f, "[{}]", inner),
            TypeAnnotation::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type annotation `{0}`")]
pub struct TypeAnnotationError(pub String);

/// Parses GraphQL type strings as used in the schema document.
impl FromStr for TypeAnnotation {
    type Err = TypeAnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let err = || TypeAnnotationError(s.to_string());

        let (body, non_null) = match text.strip_suffix('!') {
            Some(rest) => (rest.trim_end(), true),
            None => (text, false),
        };

        let base = if let Some(inner) = body.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(err)?;
            let item: TypeAnnotation = inner.parse().map_err(|_| err())?;
            TypeAnnotation::list(item)
        } else {
            let mut chars = body.chars();
            let valid = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(err());
            }
            TypeAnnotation::named(body)
        };

        if non_null {
            if base.is_non_null() {
                return Err(err());
            }
            Ok(TypeAnnotation::non_null(base))
        } else {
            Ok(base)
        }
    }
}
