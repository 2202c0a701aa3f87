use std::borrow::Cow;

use crate::ast::Root;
use crate::canonical::canonical;
use crate::error::GlimfmtResult;
use crate::options::FormatOptions;
use crate::parser::parse;
use crate::printer::render_to_string;

/// A Template owns its source text together with the parsed AST, so it can
/// be formatted (or inspected) repeatedly without re-parsing.
///
/// # Example
///
/// ```rust
/// use glimfmt::{FormatOptions, Template};
///
/// let template = Template::new("Hello,   {{ name }}!".to_string()).unwrap();
/// let formatted = template.format(&FormatOptions::default()).unwrap();
/// assert_eq!(formatted, "Hello, {{name}}!\n");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template<'a> {
    content: Cow<'a, str>,
    #[cfg_attr(feature = "serde", serde(skip))]
    ast: Root<'static>,
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Template<'_> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Define a helper struct for deserialization
        #[derive(serde::Deserialize)]
        struct TemplateHelper {
            content: String,
        }

        // Deserialize into the helper, then rebuild the AST from the content
        let helper = TemplateHelper::deserialize(deserializer)?;

        let template = Template::new(helper.content)
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse template: {}", e)))?;

        Ok(template)
    }
}

impl<'c> Template<'c> {
    /// Creates a new template by parsing the provided content string.
    ///
    /// # Errors
    ///
    /// Returns a `GlimfmtError::Parse` error if the template syntax is invalid.
    pub fn new<T: Into<Cow<'c, str>>>(content: T) -> GlimfmtResult<Self> {
        let content: Cow<'c, str> = content.into();

        let ast = parse(&content)?;

        // SAFETY: We're using unsafe to convert the lifetime to 'static since we're storing the AST
        // along with the content it references. This is safe because:
        // 1. The AST holds references to the content string
        // 2. The content string is stored in the same struct and has the same lifetime
        // 3. Both will live exactly as long as this Template instance
        // 4. The Template is not exposed outside this module with these lifetime relationships
        let ast = unsafe { std::mem::transmute::<Root<'_>, Root<'static>>(ast) };

        Ok(Self { content, ast })
    }

    /// The original source text this template was parsed from.
    pub fn source(&self) -> &str {
        &self.content
    }

    /// The parsed AST, borrowed for as long as the template lives.
    pub fn ast(&self) -> &Root<'_> {
        &self.ast
    }

    /// Render the formatted text of this template.
    ///
    /// # Errors
    ///
    /// Returns a `GlimfmtError::Render` error if the layout tree cannot be
    /// rendered.
    pub fn format(&self, options: &FormatOptions) -> GlimfmtResult<String> {
        render_to_string(&self.ast, &self.content, options)
    }

    /// The canonical form of this template's AST, for semantic comparisons
    /// that ignore layout.
    pub fn canonical(&self) -> Root<'_> {
        canonical(&self.ast)
    }
}
