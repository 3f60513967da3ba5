//! Operator declarations carried by AST nodes.
//!
//! The parser emits each operator as a short token (`+2`, `?=default:7`,
//! `#tag.path`, `**`, `..`). Each family parses into a closed enum when the
//! node is built, so an unknown token is rejected at construction instead of
//! surfacing as a lookup miss during evaluation.

use crate::error::OperatorError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `+` followed by an optional count
static TAKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+(\d*)$").unwrap());

/// Separator between operator arguments
static ARG_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*:\s*").unwrap());

/// Split argument text on `:`, trimming each piece
pub(crate) fn split_args(text: &str) -> Vec<String> {
    ARG_SEPARATOR_RE
        .split(text)
        .map(|part| part.trim().to_string())
        .collect()
}

/// Serde plumbing: operator tokens travel as strings
macro_rules! token_serde {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = OperatorError;

            fn try_from(token: String) -> Result<Self, Self::Error> {
                token.parse()
            }
        }

        impl From<$ty> for String {
            fn from(op: $ty) -> Self {
                op.to_string()
            }
        }
    };
}

/// Query override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueryOp {
    /// `+N`: keep the first N matches as a sequence; `+` alone keeps all
    Take(Option<usize>),
}

impl FromStr for QueryOp {
    type Err = OperatorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let captures = TAKE_RE
            .captures(token.trim())
            .ok_or_else(|| OperatorError::unknown("query", token))?;

        match &captures[1] {
            "" => Ok(Self::Take(None)),
            digits => digits
                .parse()
                .map(|n| Self::Take(Some(n)))
                .map_err(|_| OperatorError::unknown("query", token)),
        }
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Take(Some(n)) => write!(f, "+{}", n),
            Self::Take(None) => write!(f, "+"),
        }
    }
}

token_serde!(QueryOp);

/// Default value and alternate source constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConstraintOp {
    /// `?`: keep a defined value, else use the literal, else look the path
    /// up in `source` (the configured fallback source when `None`)
    Default {
        /// Fallback source name
        source: Option<String>,
        /// Literal default, as written
        literal: Option<String>,
    },
    /// `!=`: look the path up in `source` (null when empty), then fall back
    /// to the literal
    AltSource {
        /// Alternate source name, possibly empty
        source: String,
        /// Literal default, as written
        literal: Option<String>,
    },
    /// `!`: hand the value to the named tag handler
    TagHandler {
        /// Handler name
        handler: Option<String>,
        /// Extra handler arguments, as written
        args: Vec<String>,
    },
}

impl FromStr for ConstraintOp {
    type Err = OperatorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.trim().chars();
        let op = chars
            .next()
            .ok_or_else(|| OperatorError::unknown("constraints", token))?;
        let eq = chars.next();
        let rest: String = chars.collect();

        // A second character other than `=` is the start of the argument text
        let (alt_lookup, application) = match eq {
            Some('=') => (true, rest),
            Some(c) => (false, format!("{}{}", c, rest)),
            None => (false, String::new()),
        };

        let mut args = if eq.is_some() {
            split_args(&application)
        } else {
            Vec::new()
        };
        args.truncate(2);

        let mut args = args.into_iter();
        let first = args.next();
        let second = args.next();

        match op {
            '?' => Ok(Self::Default {
                source: first.filter(|s| !s.is_empty()),
                literal: second,
            }),
            '!' if alt_lookup => Ok(Self::AltSource {
                source: first.unwrap_or_default(),
                literal: second,
            }),
            '!' => Ok(Self::TagHandler {
                handler: first.filter(|s| !s.is_empty()),
                args: second.into_iter().collect(),
            }),
            _ => Err(OperatorError::unknown("constraints", token)),
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default { source, literal } => {
                write!(f, "?")?;
                if source.is_some() || literal.is_some() {
                    write!(f, "={}", source.as_deref().unwrap_or(""))?;
                }
                if let Some(literal) = literal {
                    write!(f, ":{}", literal)?;
                }
                Ok(())
            }
            Self::AltSource { source, literal } => {
                write!(f, "!={}", source)?;
                if let Some(literal) = literal {
                    write!(f, ":{}", literal)?;
                }
                Ok(())
            }
            Self::TagHandler { handler, args } => {
                write!(f, "!{}", handler.as_deref().unwrap_or(""))?;
                for arg in args {
                    write!(f, ":{}", arg)?;
                }
                Ok(())
            }
        }
    }
}

token_serde!(ConstraintOp);

/// Symbol declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SymbolOp {
    /// `:` (reserved, evaluation fails)
    Bind,
    /// `#` with an optional explicit tag path
    Tag(Option<String>),
}

impl FromStr for SymbolOp {
    type Err = OperatorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if let Some(tag) = token.strip_prefix('#') {
            let tag = tag.trim();
            Ok(Self::Tag((!tag.is_empty()).then(|| tag.to_string())))
        } else if token.starts_with(':') {
            Ok(Self::Bind)
        } else {
            Err(OperatorError::unknown("symbol", token))
        }
    }
}

impl fmt::Display for SymbolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind => write!(f, ":"),
            Self::Tag(tag) => write!(f, "#{}", tag.as_deref().unwrap_or("")),
        }
    }
}

token_serde!(SymbolOp);

/// Container expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EnumerateOp {
    /// `*`: the container's elements
    Elements,
    /// `**`: `[index-or-key, value]` pairs
    Entries,
}

impl FromStr for EnumerateOp {
    type Err = OperatorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "*" => Ok(Self::Elements),
            "**" => Ok(Self::Entries),
            _ => Err(OperatorError::unknown("enumerate", token)),
        }
    }
}

impl fmt::Display for EnumerateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elements => write!(f, "*"),
            Self::Entries => write!(f, "**"),
        }
    }
}

token_serde!(EnumerateOp);

/// Inception composition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InceptionMode {
    /// `.`: compose sub-templates as lenses, each rendering the previous output
    Lens,
    /// `>`: render the leader, then every sub-template against its result
    Lead,
    /// `%`: render the leader to a sequence and align sub-templates with it
    Zip,
}

impl InceptionMode {
    /// Operator character
    pub fn symbol(&self) -> char {
        match self {
            Self::Lens => '.',
            Self::Lead => '>',
            Self::Zip => '%',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Lens),
            '>' => Some(Self::Lead),
            '%' => Some(Self::Zip),
            _ => None,
        }
    }
}

impl FromStr for InceptionMode {
    type Err = OperatorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.trim().chars();
        match (chars.next().and_then(Self::from_char), chars.next()) {
            (Some(mode), None) => Ok(mode),
            _ => Err(OperatorError::unknown("inception", token)),
        }
    }
}

impl fmt::Display for InceptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

token_serde!(InceptionMode);

/// How many levels of nested inception a composition may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// Explicit level count, this level included
    Finite(usize),
    /// No count given; bounded by the nesting of the template tree
    Unbounded,
}

impl Depth {
    /// Budget left for the sub-templates of a composition at this depth,
    /// or `None` when no level is left to compose
    pub fn descend(&self) -> Option<Depth> {
        match self {
            Self::Finite(0) => None,
            Self::Finite(n) => Some(Self::Finite(n - 1)),
            Self::Unbounded => Some(Self::Unbounded),
        }
    }

    /// The tighter of two bounds
    pub fn within(self, budget: Depth) -> Depth {
        match (self, budget) {
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a.min(b)),
            (Self::Finite(n), Self::Unbounded) | (Self::Unbounded, Self::Finite(n)) => {
                Self::Finite(n)
            }
            (Self::Unbounded, Self::Unbounded) => Self::Unbounded,
        }
    }

    /// True for [`Depth::Unbounded`]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl Serialize for Depth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(n) => serializer.serialize_u64(*n as u64),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(usize),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(n) => Ok(Self::Finite(n)),
            Repr::Marker(marker) if marker == "unbounded" => Ok(Self::Unbounded),
            Repr::Marker(other) => Err(serde::de::Error::custom(format!(
                "invalid inception depth '{}'",
                other
            ))),
        }
    }
}

/// Inception declaration: mode plus depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InceptionOp {
    /// Composition mode
    pub mode: InceptionMode,
    /// Nesting depth
    pub depth: Depth,
}

impl FromStr for InceptionOp {
    type Err = OperatorError;

    /// `.` is unbounded, `...` repeats the mode character (depth 3) and
    /// `.5` gives the depth as a number
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let trimmed = token.trim();
        let mut chars = trimmed.chars();
        let op = chars
            .next()
            .ok_or_else(|| OperatorError::unknown("inception", token))?;
        let mode =
            InceptionMode::from_char(op).ok_or_else(|| OperatorError::unknown("inception", token))?;
        let rest: Vec<char> = chars.collect();

        let depth = match rest.first() {
            None => Depth::Unbounded,
            Some(&repeat) if repeat == op => {
                if rest.iter().any(|&c| c != op) {
                    return Err(OperatorError::InvalidDepth {
                        token: token.to_string(),
                    });
                }
                Depth::Finite(rest.len() + 1)
            }
            Some(_) => {
                let digits: String = rest.iter().collect();
                digits
                    .trim()
                    .parse()
                    .map(Depth::Finite)
                    .map_err(|_| OperatorError::InvalidDepth {
                        token: token.to_string(),
                    })?
            }
        };

        Ok(Self { mode, depth })
    }
}

impl fmt::Display for InceptionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth {
            Depth::Unbounded => write!(f, "{}", self.mode),
            Depth::Finite(n) => write!(f, "{}{}", self.mode, n),
        }
    }
}

token_serde!(InceptionOp);

/// Operators declared on one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operators {
    /// Query override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOp>,
    /// Default / alternate source constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ConstraintOp>,
    /// Symbol declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolOp>,
    /// Container expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerate: Option<EnumerateOp>,
    /// Inception declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inception: Option<InceptionOp>,
}

impl Operators {
    /// True when no operator is declared
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.constraints.is_none()
            && self.symbol.is_none()
            && self.enumerate.is_none()
            && self.inception.is_none()
    }
}
