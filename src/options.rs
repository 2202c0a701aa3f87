/// The quote character preferred for string literals inside mustaches.
///
/// The printer may still pick the other character for an individual literal
/// when doing so strictly reduces the number of escapes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum Quote {
    #[default]
    Double,
    Single,
}

impl Quote {
    pub(crate) const fn char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }

    pub(crate) const fn alternate(self) -> char {
        match self {
            Self::Double => '\'',
            Self::Single => '"',
        }
    }
}

/// Formatting options.
///
/// `print_width` is only consumed by the layout renderer when a Doc tree is
/// rendered to text; the translation from AST to Doc tree never looks at it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FormatOptions {
    /// Maximum line width the renderer aims for.
    pub print_width: usize,
    /// Spaces per indentation level.
    pub indent: usize,
    pub preferred_quote: Quote,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            indent: 2,
            preferred_quote: Quote::Double,
        }
    }
}
