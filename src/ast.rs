use std::borrow::Cow;

/// A position in the original template source.
///
/// `line` and `column` are 1-indexed, matching what parse errors report.
/// `offset` is the byte offset into the source and is what verbatim
/// extraction slices by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A half-open source range. Spans only ever feed sibling-adjacency and
/// verbatim-copy decisions; layout never depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub(crate) const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// A span that covers no characters. Boolean-style attributes carry one
    /// of these as their value span.
    pub(crate) const fn collapsed(at: Pos) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_zero_width(&self) -> bool {
        self.start.line == self.end.line && self.start.column == self.end.column
    }
}

/// A statement-position template node.
///
/// This is a closed set: the printer dispatches exhaustively over it and a
/// variant outside this enum cannot exist, so "unknown node type" is a
/// compile-time impossibility rather than a runtime fault.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Element(ElementNode<'a>),
    Block(BlockStatement<'a>),
    Mustache(MustacheStatement<'a>),
    /// A mustache attached to an element's open tag, e.g. `{{on "click" f}}`.
    ElementModifier(MustacheStatement<'a>),
    Text(TextNode<'a>),
    /// `{{!-- ... --}}` or `{{! ... }}`.
    MustacheComment(CommentNode<'a>),
    /// `<!-- ... -->`.
    Comment(CommentNode<'a>),
    /// A quoted attribute value mixing text and mustaches. Only ever appears
    /// as an attribute value, never in statement position.
    Concat(ConcatStatement<'a>),
}

impl Node<'_> {
    pub(crate) const fn is_mustache(&self) -> bool {
        matches!(self, Node::Mustache(_))
    }
}

/// A template body: the top-level program, or one branch of a block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root<'a> {
    pub body: Vec<Node<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode<'a> {
    pub tag: &'a str,
    pub attributes: Vec<AttrNode<'a>>,
    /// Open-tag modifiers, each a [`Node::ElementModifier`].
    pub modifiers: Vec<Node<'a>>,
    pub comments: Vec<CommentNode<'a>>,
    pub block_params: Vec<&'a str>,
    pub children: Vec<Node<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement<'a> {
    pub path: Expression<'a>,
    pub params: Vec<Expression<'a>>,
    pub hash: Hash<'a>,
    pub program: Root<'a>,
    pub inverse: Option<Root<'a>>,
    pub block_params: Vec<&'a str>,
    pub span: Span,
}

impl BlockStatement<'_> {
    /// True when the target path is exactly `name` (e.g. "if").
    pub(crate) fn path_is(&self, name: &str) -> bool {
        matches!(&self.path, Expression::Path(p) if p.original == name)
    }
}

/// `{{path args}}`, `{{{path args}}}` or an element modifier. `escaped` is
/// false for the triple-delimited form whose output skips HTML escaping.
#[derive(Debug, Clone, PartialEq)]
pub struct MustacheStatement<'a> {
    pub path: Expression<'a>,
    pub params: Vec<Expression<'a>>,
    pub hash: Hash<'a>,
    pub escaped: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression<'a> {
    pub path: Box<Expression<'a>>,
    pub params: Vec<Expression<'a>>,
    pub hash: Hash<'a>,
}

/// An element attribute. The value is always one of `Node::Text`,
/// `Node::Mustache` or `Node::Concat` by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrNode<'a> {
    pub name: &'a str,
    pub value: Node<'a>,
    pub value_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcatStatement<'a> {
    /// Text and mustache segments, in source order.
    pub parts: Vec<Node<'a>>,
}

/// Named arguments of a call, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hash<'a> {
    pub pairs: Vec<HashPair<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair<'a> {
    pub key: &'a str,
    pub value: Expression<'a>,
}

/// A raw run of template text. The only node whose printed form depends on
/// its neighbouring siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode<'a> {
    pub chars: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode<'a> {
    pub value: &'a str,
    pub span: Span,
}

/// An expression-position node: the head or an argument of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'a> {
    Path(PathExpression<'a>),
    String(StringLiteral<'a>),
    Number(NumberLiteral),
    Boolean(BooleanLiteral),
    Undefined,
    Null,
    SubExpression(SubExpression<'a>),
}

/// A dotted/segmented path, stored as the verbatim source text so printing
/// can reproduce it unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression<'a> {
    pub original: &'a str,
}

/// A string literal with escape sequences of the delimiting quote decoded.
///
/// Borrowed when the source contained no escapes - otherwise we are forced
/// to allocate.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral<'a> {
    pub value: Cow<'a, str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
}
