pub type GlimfmtResult<T> = std::result::Result<T, GlimfmtError>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    UnexpectedEof {
        /// Describes what was expected, e.g., "(expected '}}')"
        expected_what: String,
    },
    Expected {
        description: String,
    },
    MismatchedClosingTag {
        expected: String,
        found: String,
    },
    InvalidNumber {
        literal: String,
    },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof { expected_what } => {
                write!(f, "Unexpected EOF{}", expected_what)
            }
            Self::Expected { description } => {
                write!(f, "Expected {}", description)
            }
            Self::MismatchedClosingTag { expected, found } => {
                write!(
                    f,
                    "Closing tag '{}' does not match opening tag '{}'",
                    found, expected
                )
            }
            Self::InvalidNumber { literal } => {
                write!(f, "Invalid number literal '{}'", literal)
            }
        }
    }
}

impl std::error::Error for ParseErrorKind {}

impl ParseErrorKind {
    pub fn unexpected_eof(expected: Option<String>) -> Self {
        Self::UnexpectedEof {
            expected_what: expected.map_or_else(String::new, |e| format!(" (expected '{}')", e)),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.line, self.column, self.kind
        )
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlimfmtError {
    Parse(ParseError),
    Render { message: String },
}

impl std::fmt::Display for GlimfmtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(parse_error) => {
                write!(f, "{}", parse_error)
            }
            Self::Render { message } => {
                write!(f, "Rendering error: {}", message)
            }
        }
    }
}

impl std::error::Error for GlimfmtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(parse_error) => Some(parse_error),
            Self::Render { .. } => None,
        }
    }
}

impl From<ParseError> for GlimfmtError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}
