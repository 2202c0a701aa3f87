//! A deterministic formatter for Handlebars-style templates.
//!
//! Templates are parsed into an AST, translated into a layout document, and
//! rendered against a configurable line width. The same input and options
//! always produce the same output, formatting is idempotent, and the
//! formatted template parses back to the same canonical AST as the input.
//!
//! ```rust
//! use glimfmt::{format, FormatOptions};
//!
//! let out = format("Hello,   {{ name }}!", &FormatOptions::default()).unwrap();
//! assert_eq!(out, "Hello, {{name}}!\n");
//! ```

mod ast;
mod canonical;
mod error;
mod ignore;
mod options;
mod parser;
mod printer;
mod quotes;
mod template;
mod whitespace;

// Public exports.
pub use ast::{
    AttrNode, BlockStatement, BooleanLiteral, CommentNode, ConcatStatement, ElementNode,
    Expression, Hash, HashPair, MustacheStatement, Node, NumberLiteral, PathExpression, Pos, Root,
    Span, StringLiteral, SubExpression, TextNode,
};
pub use canonical::canonical;
pub use error::{GlimfmtError, GlimfmtResult, ParseError, ParseErrorKind};
pub use options::{FormatOptions, Quote};
pub use parser::parse;
pub use printer::{format, print_to_doc};
pub use template::Template;
