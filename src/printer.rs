//! Translation from the template AST to a layout document.
//!
//! Printing is split in two: this module builds a `pretty` Doc tree that
//! encodes every layout *choice* (where a group may stay flat, where a break
//! is forced, what indents), and the renderer then picks line breaks against
//! the configured width. The translation itself never measures anything, so
//! the same AST always yields the same Doc tree.

use std::borrow::Cow;

use pretty::{Arena, DocAllocator, DocBuilder};

use crate::ast::{
    AttrNode, BlockStatement, ConcatStatement, ElementNode, Expression, Hash, HashPair,
    MustacheStatement, Node, Root, Span,
};
use crate::error::{GlimfmtError, GlimfmtResult};
use crate::ignore::{is_ignored, is_ignored_file};
use crate::options::FormatOptions;
use crate::parser::{parse, VOID_TAGS};
use crate::quotes::{attr_delimiter, escape_attr_text, quote};
use crate::whitespace::classify;

type Doc<'a> = DocBuilder<'a, Arena<'a>>;

/// Where a node sits in the tree. Printing a node only ever needs one level
/// of context: its parent kind and its siblings, nothing deeper.
#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub(crate) parent: Parent<'a>,
    pub(crate) siblings: &'a [Node<'a>],
    pub(crate) index: usize,
}

#[derive(Clone, Copy)]
pub(crate) enum Parent<'a> {
    Root,
    Element,
    BlockBody,
    BlockInverse,
    Attr(&'a AttrNode<'a>),
    Concat,
}

/// Format a template.
///
/// The output is deterministic, ends with exactly one trailing newline (or
/// is empty when the template holds nothing printable), and reformatting
/// the output reproduces it unchanged.
///
/// # Errors
///
/// Returns an error when the template does not parse, or when rendering the
/// layout tree fails.
pub fn format(source: &str, options: &FormatOptions) -> GlimfmtResult<String> {
    let root = parse(source)?;
    render_to_string(&root, source, options)
}

/// Print and render an already-parsed template.
pub(crate) fn render_to_string(
    root: &Root<'_>,
    source: &str,
    options: &FormatOptions,
) -> GlimfmtResult<String> {
    let arena = Arena::new();
    let doc = print_to_doc(root, source, *options, &arena);

    let mut out = Vec::new();
    doc.render(options.print_width, &mut out)
        .map_err(|e| GlimfmtError::Render {
            message: e.to_string(),
        })?;
    let mut text = String::from_utf8(out).map_err(|e| GlimfmtError::Render {
        message: e.to_string(),
    })?;
    let len = text.trim_end_matches('\n').len();
    text.truncate(len);
    if !text.is_empty() {
        text.push('\n');
    }
    log::debug!("formatted {} bytes into {} bytes", source.len(), text.len());
    Ok(text)
}

/// Translate a parsed template into a layout document in `arena`.
///
/// `source` must be the text the template was parsed from: verbatim regions
/// are copied out of it by byte offset.
pub fn print_to_doc<'a>(
    root: &'a Root<'a>,
    source: &'a str,
    options: FormatOptions,
    arena: &'a Arena<'a>,
) -> DocBuilder<'a, Arena<'a>> {
    let printer = Printer {
        arena,
        source,
        options,
    };
    printer.print_root(root)
}

struct Printer<'a> {
    arena: &'a Arena<'a>,
    source: &'a str,
    options: FormatOptions,
}

/// One printed sibling. `raw_text` marks verbatim whitespace from an ignore
/// region, which must not have soft lines placed around it.
struct Child<'a> {
    doc: Doc<'a>,
    raw_text: bool,
}

impl<'a> Printer<'a> {
    fn indent(&self) -> isize {
        isize::try_from(self.options.indent).unwrap_or(2)
    }

    fn print_root(&self, root: &'a Root<'a>) -> Doc<'a> {
        if is_ignored_file(root) {
            return self.arena.text(self.source.trim());
        }
        self.print_body(&root.body, Parent::Root)
    }

    /// A statement body: printable children joined by soft lines. Any forced
    /// break inside a child (a block, a broken element) breaks the group.
    fn print_body(&self, body: &'a [Node<'a>], parent: Parent<'a>) -> Doc<'a> {
        self.join_children(self.print_children(body, parent)).group()
    }

    /// Join printed siblings with soft lines. Verbatim whitespace already
    /// carries its own separation, so no soft line goes next to it.
    fn join_children(&self, children: Vec<Child<'a>>) -> Doc<'a> {
        let mut doc = self.arena.nil();
        let mut prev_raw = true;
        for child in children {
            if !prev_raw && !child.raw_text {
                doc = doc.append(self.arena.line_());
            }
            doc = doc.append(child.doc);
            prev_raw = child.raw_text;
        }
        doc
    }

    /// Print each child of a body. Text nodes pass through the whitespace
    /// rules and are dropped entirely when nothing of them remains; ignored
    /// nodes are copied verbatim from the source.
    fn print_children(&self, body: &'a [Node<'a>], parent: Parent<'a>) -> Vec<Child<'a>> {
        let mut out = Vec::with_capacity(body.len());
        for (index, node) in body.iter().enumerate() {
            let ctx = Ctx {
                parent,
                siblings: body,
                index,
            };
            if is_ignored(&ctx) {
                out.push(Child {
                    doc: self.print_node_verbatim(node),
                    raw_text: matches!(node, Node::Text(_)),
                });
                continue;
            }
            if let Node::Text(text) = node {
                let printed = classify(text, &ctx);
                if printed.is_empty() {
                    continue;
                }
                out.push(Child {
                    doc: self.arena.text(printed),
                    raw_text: false,
                });
                continue;
            }
            out.push(Child {
                doc: self.print_node(node, &ctx),
                raw_text: false,
            });
        }
        out
    }

    fn print_node(&self, node: &'a Node<'a>, ctx: &Ctx<'a>) -> Doc<'a> {
        let a = self.arena;
        match node {
            Node::Element(el) => self.print_element(el),
            Node::Block(block) => self.print_block(block, ctx),
            Node::Mustache(m) | Node::ElementModifier(m) => self.print_mustache(m, ctx),
            Node::Text(text) => a.text(classify(text, ctx)),
            Node::MustacheComment(c) => a
                .text("{{!--")
                .append(a.text(c.value))
                .append(a.text("--}}")),
            Node::Comment(c) => a
                .text("<!--")
                .append(a.text(c.value))
                .append(a.text("-->")),
            Node::Concat(concat) => self.print_concat(concat),
        }
    }

    /// The verbatim form of a node inside an ignore region: its exact source
    /// bytes. Text nodes keep their raw whitespace.
    fn print_node_verbatim(&self, node: &'a Node<'a>) -> Doc<'a> {
        match node {
            Node::Text(text) => self.arena.text(text.chars),
            Node::Element(el) => self.verbatim(el.span),
            Node::Block(block) => self.verbatim(block.span),
            Node::Mustache(m) | Node::ElementModifier(m) => self.verbatim(m.span),
            Node::MustacheComment(c) | Node::Comment(c) => self.verbatim(c.span),
            // Never in statement position, so never ignorable.
            Node::Concat(concat) => self.print_concat(concat),
        }
    }

    fn verbatim(&self, span: Span) -> Doc<'a> {
        let slice = &self.source[span.start.offset..span.end.offset];
        self.arena.text(slice.trim())
    }

    fn is_component(tag: &str) -> bool {
        tag.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            || tag.contains('.')
            || tag.contains(':')
    }

    fn print_element(&self, el: &'a ElementNode<'a>) -> Doc<'a> {
        if el.tag.eq_ignore_ascii_case("pre") {
            return self.verbatim(el.span);
        }
        let a = self.arena;

        // Components with no children close themselves; markup void tags
        // always do.
        let void = (Self::is_component(el.tag) && el.children.is_empty())
            || VOID_TAGS.contains(&el.tag);
        let open = self.print_open_tag(el, void);
        if void {
            return open;
        }

        let children = self.print_children(&el.children, Parent::Element);
        let close = a
            .text("</")
            .append(a.text(el.tag))
            .append(a.text(">"));
        if children.is_empty() {
            return open.append(close).group();
        }
        let ends_raw = children.last().is_some_and(|child| child.raw_text);
        let mut body = a.nil();
        let mut prev_raw = false;
        for child in children {
            if !child.raw_text && !prev_raw {
                body = body.append(a.line_());
            }
            body = body.append(child.doc);
            prev_raw = child.raw_text;
        }
        // Verbatim trailing whitespace already ends the body; otherwise the
        // close tag takes its own line whenever the body broke.
        let end = if ends_raw {
            a.nil()
        } else {
            a.hardline().flat_alt(a.nil())
        };
        open.append(body.nest(self.indent()).append(end))
            .append(close)
            .group()
    }

    fn print_open_tag(&self, el: &'a ElementNode<'a>, void: bool) -> Doc<'a> {
        let a = self.arena;
        let mut parts: Vec<Doc<'a>> = Vec::new();
        for attr in &el.attributes {
            parts.push(self.print_attr(attr));
        }
        for modifier in &el.modifiers {
            if let Node::ElementModifier(m) = modifier {
                parts.push(self.print_modifier(m));
            }
        }
        for comment in &el.comments {
            parts.push(
                a.text("{{!--")
                    .append(a.text(comment.value))
                    .append(a.text("--}}")),
            );
        }
        if !el.block_params.is_empty() {
            parts.push(a.text(format!("as |{}|", el.block_params.join(" "))));
        }

        // With nothing between the tag name and `>` there is nothing to
        // break over, so the tag prints as one token.
        if parts.is_empty() {
            let end = if void { " />" } else { ">" };
            return a.text("<").append(a.text(el.tag)).append(a.text(end));
        }
        let attrs = a
            .line()
            .append(a.intersperse(parts, a.line()))
            .nest(self.indent());
        // The void form keeps a space before `/>` on one line; the open form
        // hugs its `>`.
        let end = if void {
            a.line().append(a.text("/>"))
        } else {
            a.line_().append(a.text(">"))
        };
        a.text("<")
            .append(a.text(el.tag))
            .append(attrs)
            .append(end)
            .group()
    }

    fn print_attr(&self, attr: &'a AttrNode<'a>) -> Doc<'a> {
        let a = self.arena;
        // A zero-width value span marks a bare (boolean-style) attribute.
        if attr.value_span.is_zero_width() {
            return a.text(attr.name);
        }
        let name = a.text(attr.name).append(a.text("="));
        match &attr.value {
            Node::Text(text) => {
                let delimiter =
                    attr_delimiter(text.chars.contains('"'), text.chars.contains('\''));
                let value = escape_attr_text(Cow::Borrowed(text.chars), delimiter);
                name.append(a.text(delimiter))
                    .append(a.text(value))
                    .append(a.text(delimiter))
            }
            Node::Concat(concat) => name.append(self.print_concat(concat)),
            Node::Mustache(_)
            | Node::ElementModifier(_)
            | Node::Element(_)
            | Node::Block(_)
            | Node::MustacheComment(_)
            | Node::Comment(_) => {
                let ctx = Ctx {
                    parent: Parent::Attr(attr),
                    siblings: std::slice::from_ref(&attr.value),
                    index: 0,
                };
                name.append(self.print_node(&attr.value, &ctx))
            }
        }
    }

    fn print_concat(&self, concat: &'a ConcatStatement<'a>) -> Doc<'a> {
        let a = self.arena;
        let contains_double = concat
            .parts
            .iter()
            .any(|part| matches!(part, Node::Text(t) if t.chars.contains('"')));
        let contains_single = concat
            .parts
            .iter()
            .any(|part| matches!(part, Node::Text(t) if t.chars.contains('\'')));
        let delimiter = attr_delimiter(contains_double, contains_single);
        let mut doc = a.text(delimiter);
        for (index, part) in concat.parts.iter().enumerate() {
            let ctx = Ctx {
                parent: Parent::Concat,
                siblings: &concat.parts,
                index,
            };
            if let Node::Text(text) = part {
                let printed = classify(text, &ctx);
                if !printed.is_empty() {
                    doc = doc.append(a.text(escape_attr_text(printed, delimiter)));
                }
            } else {
                doc = doc.append(self.print_node(part, &ctx));
            }
        }
        doc.append(a.text(delimiter))
    }

    fn print_mustache(&self, m: &'a MustacheStatement<'a>, ctx: &Ctx<'a>) -> Doc<'a> {
        let a = self.arena;
        let (open, close) = if m.escaped {
            ("{{", "}}")
        } else {
            ("{{{", "}}}")
        };
        // Inside a concat value or a `class` attribute the mustache must
        // never break: its output lands inside a quoted attribute where a
        // newline would change the attribute text.
        let plain = match ctx.parent {
            Parent::Concat => true,
            Parent::Attr(attr) => attr.name.eq_ignore_ascii_case("class"),
            Parent::Root | Parent::Element | Parent::BlockBody | Parent::BlockInverse => false,
        };
        let body = if plain {
            self.print_call_plain(&m.path, &m.params, &m.hash)
        } else {
            self.print_call(&m.path, &m.params, &m.hash)
        };
        a.text(open).append(body).append(a.text(close))
    }

    fn print_modifier(&self, m: &'a MustacheStatement<'a>) -> Doc<'a> {
        let a = self.arena;
        a.text("{{")
            .append(self.print_call(&m.path, &m.params, &m.hash))
            .append(a.text("}}"))
    }

    /// A call head with its arguments: `path arg1 arg2 key=value`. The
    /// arguments share one group so they either all stay on the line or all
    /// move under the head.
    fn print_call(
        &self,
        path: &'a Expression<'a>,
        params: &'a [Expression<'a>],
        hash: &'a Hash<'a>,
    ) -> Doc<'a> {
        let a = self.arena;
        let head = self.print_expression(path);
        if params.is_empty() && hash.pairs.is_empty() {
            return head;
        }
        let args = params
            .iter()
            .map(|param| self.print_expression(param))
            .chain(hash.pairs.iter().map(|pair| self.print_hash_pair(pair)));
        head.append(
            a.line()
                .append(a.intersperse(args, a.line()))
                .nest(self.indent()),
        )
        .group()
    }

    /// The same call shape with plain spaces and no breaking choices.
    fn print_call_plain(
        &self,
        path: &'a Expression<'a>,
        params: &'a [Expression<'a>],
        hash: &'a Hash<'a>,
    ) -> Doc<'a> {
        let a = self.arena;
        let mut doc = self.print_expression(path);
        for param in params {
            doc = doc.append(a.text(" ")).append(self.print_expression(param));
        }
        for pair in &hash.pairs {
            doc = doc.append(a.text(" ")).append(self.print_hash_pair(pair));
        }
        doc
    }

    fn print_hash_pair(&self, pair: &'a HashPair<'a>) -> Doc<'a> {
        self.arena
            .text(pair.key)
            .append(self.arena.text("="))
            .append(self.print_expression(&pair.value))
    }

    fn print_expression(&self, expr: &'a Expression<'a>) -> Doc<'a> {
        let a = self.arena;
        match expr {
            Expression::Path(path) => a.text(path.original),
            Expression::String(s) => a.text(quote(&s.value, self.options.preferred_quote)),
            Expression::Number(n) => a.text(n.value.to_string()),
            Expression::Boolean(b) => a.text(if b.value { "true" } else { "false" }),
            Expression::Undefined => a.text("undefined"),
            Expression::Null => a.text("null"),
            Expression::SubExpression(sub) => {
                let args: Vec<Doc<'a>> = sub
                    .params
                    .iter()
                    .map(|param| self.print_expression(param))
                    .chain(sub.hash.pairs.iter().map(|pair| self.print_hash_pair(pair)))
                    .collect();
                let inner = if args.is_empty() {
                    a.nil()
                } else {
                    a.line()
                        .append(a.intersperse(args, a.line()).group())
                        .nest(self.indent())
                };
                a.text("(")
                    .append(self.print_expression(&sub.path))
                    .append(inner)
                    .append(a.line_())
                    .append(a.text(")"))
                    .group()
            }
        }
    }

    fn block_params_suffix(&self, block: &'a BlockStatement<'a>) -> Doc<'a> {
        if block.block_params.is_empty() {
            self.arena.nil()
        } else {
            self.arena
                .text(format!(" as |{}|", block.block_params.join(" ")))
        }
    }

    fn print_block(&self, block: &'a BlockStatement<'a>, ctx: &Ctx<'a>) -> Doc<'a> {
        let a = self.arena;

        // A block that is the sole occupant of an inverse branch and targets
        // `if` prints as a continuation of its parent's chain: `{{else if}}`
        // with no closing tag of its own.
        let is_else_if = matches!(ctx.parent, Parent::BlockInverse)
            && ctx.siblings.len() == 1
            && block.path_is("if");
        // And the matching view from the parent: an inverse holding exactly
        // one `if` block is printed as a chain, without `{{else}}`.
        let has_else_if = block.inverse.as_ref().is_some_and(|inverse| {
            inverse.body.len() == 1
                && matches!(&inverse.body[0], Node::Block(nested) if nested.path_is("if"))
        });

        let call = self
            .print_call(&block.path, &block.params, &block.hash)
            .append(self.block_params_suffix(block));
        let opener = if is_else_if {
            a.text("{{else ").append(call).append(a.text("}}")).group()
        } else {
            a.text("{{#").append(call).append(a.text("}}")).group()
        };
        let closer = a
            .text("{{/")
            .append(self.print_expression(&block.path))
            .append(a.text("}}"));

        if block.inverse.is_none() && !is_else_if {
            // No branches: the body may collapse onto one line only when it
            // holds nothing printable.
            let children = self.print_children(&block.program.body, Parent::BlockBody);
            let has_children = !children.is_empty();
            let body = self.join_children(children).group();
            let end = if has_children { a.hardline() } else { a.line_() };
            return opener.append(
                a.line_()
                    .append(body)
                    .nest(self.indent())
                    .append(end)
                    .append(closer)
                    .group(),
            );
        }

        let program = self.print_body(&block.program.body, Parent::BlockBody);
        let mut doc = opener.append(a.hardline().append(program).nest(self.indent()));
        if let Some(inverse) = &block.inverse {
            let inverse_doc = self.print_body(&inverse.body, Parent::BlockInverse);
            if has_else_if {
                doc = doc.append(a.hardline()).append(inverse_doc);
            } else {
                doc = doc
                    .append(a.hardline())
                    .append(a.text("{{else}}"))
                    .append(a.hardline().append(inverse_doc).nest(self.indent()));
            }
        }
        if !is_else_if {
            doc = doc.append(a.hardline()).append(closer);
        }
        doc
    }
}
