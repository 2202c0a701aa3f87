use std::borrow::Cow;

use crate::ast::{
    AttrNode, BlockStatement, BooleanLiteral, CommentNode, ConcatStatement, ElementNode,
    Expression, Hash, HashPair, MustacheStatement, Node, NumberLiteral, PathExpression, Pos, Root,
    Span, StringLiteral, SubExpression, TextNode,
};
use crate::error::{ParseError, ParseErrorKind};

type ParseResult<T> = Result<T, ParseError>;

/// Markup tags that never have children or a closing tag.
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parse a template into its AST.
///
/// # Errors
///
/// Returns a [`ParseError`] with a line/column position when the template
/// syntax is invalid - unterminated mustaches or comments, mismatched
/// closing tags, and the like.
pub fn parse(input: &str) -> ParseResult<Root<'_>> {
    let mut parser = Parser::new(input);
    let start = parser.here();
    let body = parser.parse_nodes()?;
    if !parser.eof() {
        let rest = parser.lookahead_snippet();
        return Err(parser.make_error(ParseErrorKind::Expected {
            description: format!("end of template, found '{}'", rest),
        }));
    }
    log::debug!("parsed template: {} bytes, {} top-level nodes", input.len(), body.len());
    Ok(Root {
        body,
        span: Span::new(start, parser.here()),
    })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// The starting location of the current line
    line_start_pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            line_start_pos: 0,
        }
    }

    #[inline]
    fn current_column(&self) -> usize {
        self.pos - self.line_start_pos + 1
    }

    #[inline]
    fn here(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.current_column(),
            offset: self.pos,
        }
    }

    #[inline]
    fn make_error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            column: self.current_column(),
            kind,
        }
    }

    /// Advances the parser position by char_len bytes, correctly handling
    /// multi-byte characters. Updates line and column numbers if a newline is
    /// encountered.
    #[inline]
    fn advance_by_char(&mut self, current_char: char, char_len: usize) {
        if current_char == '\n' {
            self.line += 1;
            self.line_start_pos = self.pos + char_len;
        }
        self.pos += char_len;
    }

    /// Advances the parser position by `len` bytes.
    /// This method assumes that the consumed string `s` does NOT contain newlines.
    /// If it can, line/column tracking will be incorrect. Used for fixed delimiters.
    #[inline]
    fn advance_bytes_no_newline(&mut self, len: usize) {
        self.pos += len;
    }

    /// Advances the parser position by `len` bytes, char by char, keeping
    /// line tracking correct for content that may contain newlines.
    fn advance_str(&mut self, len: usize) {
        let end = self.pos + len;
        while self.pos < end {
            let Some(current_char) = self.peek_char() else {
                break;
            };
            self.advance_by_char(current_char, current_char.len_utf8());
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Peek if the remaining input starts with `s`
    fn peek(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Multi-token peek which checks if the remaining input starts with any
    /// of the provided tokens, ignoring whitespace between.
    fn peek_n<const N: usize>(&self, tokens: [&str; N]) -> bool {
        if !self.peek(tokens[0]) {
            return false;
        }

        let mut parser = Self {
            input: self.input,
            pos: self.pos + tokens[0].len(),
            line: self.line,
            line_start_pos: self.line_start_pos,
        };

        for token in &tokens[1..] {
            parser.consume_whitespace();
            if !parser.peek(token) {
                return false;
            }
            parser.advance_bytes_no_newline(token.len());
        }
        true
    }

    /// Peek for an `{{else` keyword that is actually the else of a block,
    /// not the start of a path like `{{elsewhere}}`.
    fn peek_else(&self) -> bool {
        if !self.peek("{{else") {
            return false;
        }
        match self.input[self.pos + "{{else".len()..].chars().next() {
            Some(c) => c.is_ascii_whitespace() || c == '}',
            None => false,
        }
    }

    /// Consume `s` if the remaining input starts with it.
    /// Assumes `s` does not contain newlines.
    fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.advance_bytes_no_newline(s.len());
            true
        } else {
            false
        }
    }

    /// Consume leading whitespace, handling newlines correctly.
    fn consume_whitespace(&mut self) {
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_whitespace() {
                self.advance_by_char(current_char, current_char.len_utf8());
            } else {
                break;
            }
        }
    }

    fn lookahead_snippet(&self) -> &'a str {
        &self.input[self.pos..std::cmp::min(self.pos + 10, self.input.len())]
    }

    /// Expect `s` to be the start of the remaining input, consume it or return Err.
    /// Assumes `s` does not contain newlines.
    fn expect(&mut self, s: &str) -> ParseResult<()> {
        if self.consume(s) {
            Ok(())
        } else {
            Err(self.make_error(ParseErrorKind::Expected {
                description: format!("'{}', found '{}'", s, self.lookahead_snippet()),
            }))
        }
    }

    /// True when the input at the cursor opens an element: `<` followed by a
    /// tag-name character. A lone `<` in prose stays text.
    fn starts_element(&self) -> bool {
        self.peek("<")
            && self.input[self.pos + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
    }

    /// Parse statement nodes until EOF or a construct the caller owns: a
    /// closing tag, an `{{else}}` or a `{{/block}}` terminator.
    fn parse_nodes(&mut self) -> ParseResult<Vec<Node<'a>>> {
        let mut nodes = Vec::new();
        while !self.eof() {
            if self.peek("</") || self.peek("{{/") || self.peek_else() {
                break;
            }
            if self.peek("{{") {
                nodes.push(self.parse_mustache_node()?);
            } else if self.peek("<!--") {
                nodes.push(self.parse_markup_comment()?);
            } else if self.starts_element() {
                nodes.push(self.parse_element()?);
            } else {
                nodes.push(self.parse_text()?);
            }
        }
        Ok(nodes)
    }

    /// A run of raw text up to the next element, comment or mustache.
    fn parse_text(&mut self) -> ParseResult<Node<'a>> {
        let start = self.here();
        while !self.eof() {
            if self.peek("{{") || self.peek("<!--") || self.peek("</") || self.starts_element() {
                break;
            }
            let Some(current_char) = self.peek_char() else {
                break;
            };
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        Ok(Node::Text(TextNode {
            chars: &self.input[start.offset..self.pos],
            span: Span::new(start, self.here()),
        }))
    }

    fn parse_markup_comment(&mut self) -> ParseResult<Node<'a>> {
        let start = self.here();
        self.expect("<!--")?;
        let value_start = self.pos;
        let Some(rel) = self.input[self.pos..].find("-->") else {
            return Err(self.make_error(ParseErrorKind::unexpected_eof(Some("-->".to_string()))));
        };
        let value = &self.input[value_start..value_start + rel];
        self.advance_str(rel + "-->".len());
        Ok(Node::Comment(CommentNode {
            value,
            span: Span::new(start, self.here()),
        }))
    }

    /// Dispatch a `{{` opener: comment, block, or plain mustache.
    fn parse_mustache_node(&mut self) -> ParseResult<Node<'a>> {
        if self.peek("{{!") {
            return Ok(Node::MustacheComment(self.parse_mustache_comment()?));
        }
        if self.peek("{{#") {
            return self.parse_block();
        }
        Ok(Node::Mustache(self.parse_mustache_statement()?))
    }

    /// `{{!-- ... --}}` or the short `{{! ... }}` form.
    fn parse_mustache_comment(&mut self) -> ParseResult<CommentNode<'a>> {
        let start = self.here();
        let closer = if self.consume("{{!--") {
            "--}}"
        } else {
            self.expect("{{!")?;
            "}}"
        };
        let value_start = self.pos;
        let Some(rel) = self.input[self.pos..].find(closer) else {
            return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(closer.to_string()))));
        };
        let value = &self.input[value_start..value_start + rel];
        self.advance_str(rel + closer.len());
        Ok(CommentNode {
            value,
            span: Span::new(start, self.here()),
        })
    }

    /// `{{path args}}` or the unescaped `{{{path args}}}` form.
    fn parse_mustache_statement(&mut self) -> ParseResult<MustacheStatement<'a>> {
        let start = self.here();
        let escaped = !self.consume("{{{");
        if escaped {
            self.expect("{{")?;
        }
        let closer = if escaped { "}}" } else { "}}}" };
        let (path, params, hash) = self.parse_call(closer)?;
        self.consume_whitespace();
        self.expect(closer)?;
        Ok(MustacheStatement {
            path,
            params,
            hash,
            escaped,
            span: Span::new(start, self.here()),
        })
    }

    /// The shared interior of mustaches, blocks and subexpressions: a head
    /// expression followed by positional arguments and `key=value` pairs.
    /// Stops (without consuming) at `closer`, `)` or an `as |` declaration.
    fn parse_call(
        &mut self,
        closer: &str,
    ) -> ParseResult<(Expression<'a>, Vec<Expression<'a>>, Hash<'a>)> {
        self.consume_whitespace();
        let path = self.parse_expression()?;
        let mut params = Vec::new();
        let mut pairs = Vec::new();
        loop {
            self.consume_whitespace();
            if self.eof() {
                return Err(
                    self.make_error(ParseErrorKind::unexpected_eof(Some(closer.to_string())))
                );
            }
            if self.peek(closer) || self.peek(")") || self.peek_n(["as", "|"]) {
                break;
            }
            if let Some(key) = self.peek_hash_key() {
                self.advance_bytes_no_newline(key.len() + "=".len());
                let value = self.parse_expression()?;
                pairs.push(HashPair { key, value });
            } else {
                params.push(self.parse_expression()?);
            }
        }
        Ok((path, params, Hash { pairs }))
    }

    /// If the cursor sits on `key=` (and not `key==`), return the key
    /// without consuming anything.
    fn peek_hash_key(&self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        let mut iter = rest.char_indices();
        let (_, first) = iter.next()?;
        if !(first.is_ascii_alphabetic() || first == '_' || first == '@') {
            return None;
        }
        for (i, c) in iter {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '@') {
                continue;
            }
            if c == '=' && !rest[i + 1..].starts_with('=') {
                return Some(&rest[..i]);
            }
            return None;
        }
        None
    }

    fn parse_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.consume_whitespace();
        let Some(current_char) = self.peek_char() else {
            return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(
                "expression".to_string(),
            ))));
        };
        if current_char == '(' {
            return self.parse_sub_expression();
        }
        if current_char == '"' || current_char == '\'' {
            return self.parse_string_literal(current_char);
        }
        if current_char.is_ascii_digit()
            || (current_char == '-'
                && self.input[self.pos + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit()))
        {
            return self.parse_number_literal();
        }
        let token = self.consume_path_token()?;
        Ok(match token {
            "true" => Expression::Boolean(BooleanLiteral { value: true }),
            "false" => Expression::Boolean(BooleanLiteral { value: false }),
            "null" => Expression::Null,
            "undefined" => Expression::Undefined,
            _ => Expression::Path(PathExpression { original: token }),
        })
    }

    fn parse_sub_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.expect("(")?;
        let (path, params, hash) = self.parse_call(")")?;
        self.consume_whitespace();
        self.expect(")")?;
        Ok(Expression::SubExpression(SubExpression {
            path: Box::new(path),
            params,
            hash,
        }))
    }

    /// A string literal. Escapes of the delimiting quote are decoded; every
    /// other backslash sequence passes through untouched so that printing
    /// can reproduce it.
    fn parse_string_literal(&mut self, quote_char: char) -> ParseResult<Expression<'a>> {
        self.advance_bytes_no_newline(quote_char.len_utf8());
        let content_start = self.pos;
        let mut owned: Option<String> = None;
        loop {
            let Some(current_char) = self.peek_char() else {
                return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(
                    quote_char.to_string(),
                ))));
            };
            if current_char == quote_char {
                break;
            }
            if current_char == '\\'
                && self.input[self.pos + 1..].starts_with(quote_char)
            {
                let decoded = owned
                    .get_or_insert_with(|| self.input[content_start..self.pos].to_string());
                decoded.push(quote_char);
                self.advance_bytes_no_newline(1 + quote_char.len_utf8());
                continue;
            }
            if let Some(decoded) = owned.as_mut() {
                decoded.push(current_char);
            }
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        let value = match owned {
            Some(decoded) => Cow::Owned(decoded),
            None => Cow::Borrowed(&self.input[content_start..self.pos]),
        };
        self.advance_bytes_no_newline(quote_char.len_utf8());
        Ok(Expression::String(StringLiteral { value }))
    }

    fn parse_number_literal(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.pos;
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_digit() || matches!(current_char, '.' | 'e' | 'E' | '+' | '-')
            {
                self.advance_bytes_no_newline(current_char.len_utf8());
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.pos];
        let value = literal.parse::<f64>().map_err(|_| {
            self.make_error(ParseErrorKind::InvalidNumber {
                literal: literal.to_string(),
            })
        })?;
        Ok(Expression::Number(NumberLiteral { value }))
    }

    /// Consume a path token: everything up to whitespace or a structural
    /// delimiter. Paths keep their exact source spelling.
    fn consume_path_token(&mut self) -> ParseResult<&'a str> {
        let start = self.pos;
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_whitespace()
                || matches!(current_char, '}' | ')' | '(' | '=' | '|' | '"' | '\'')
            {
                break;
            }
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        if start == self.pos {
            Err(self.make_error(ParseErrorKind::Expected {
                description: "expression".to_string(),
            }))
        } else {
            Ok(&self.input[start..self.pos])
        }
    }

    /// An optional `as |name name|` block-parameter declaration.
    fn parse_block_params(&mut self) -> ParseResult<Vec<&'a str>> {
        self.consume_whitespace();
        if !self.peek_n(["as", "|"]) {
            return Ok(Vec::new());
        }
        self.expect("as")?;
        self.consume_whitespace();
        self.expect("|")?;
        let mut names = Vec::new();
        loop {
            self.consume_whitespace();
            if self.consume("|") {
                break;
            }
            names.push(self.consume_path_token()?);
        }
        Ok(names)
    }

    /// `{{#path args}}body{{else ...}}...{{/path}}`.
    fn parse_block(&mut self) -> ParseResult<Node<'a>> {
        let start = self.here();
        self.expect("{{#")?;
        let (path, params, hash) = self.parse_call("}}")?;
        let block_params = self.parse_block_params()?;
        self.consume_whitespace();
        self.expect("}}")?;
        let (program, inverse) = self.parse_block_bodies()?;
        self.expect("{{/")?;
        self.consume_whitespace();
        let close_name = self.consume_path_token()?;
        self.consume_whitespace();
        self.expect("}}")?;
        if let Expression::Path(open) = &path {
            if open.original != close_name {
                return Err(self.make_error(ParseErrorKind::MismatchedClosingTag {
                    expected: open.original.to_string(),
                    found: close_name.to_string(),
                }));
            }
        }
        Ok(Node::Block(BlockStatement {
            path,
            params,
            hash,
            program,
            inverse,
            block_params,
            span: Span::new(start, self.here()),
        }))
    }

    /// The bodies of a block: the primary branch, then optionally a plain
    /// `{{else}}` branch or an `{{else path ...}}` chain. A chained else
    /// parses as an inverse body holding a single nested block, and the
    /// whole chain shares the outermost `{{/...}}` terminator.
    fn parse_block_bodies(&mut self) -> ParseResult<(Root<'a>, Option<Root<'a>>)> {
        let body_start = self.here();
        let body = self.parse_nodes()?;
        let program = Root {
            body,
            span: Span::new(body_start, self.here()),
        };
        if self.eof() {
            return Err(self.make_error(ParseErrorKind::unexpected_eof(Some("{{/".to_string()))));
        }
        if !self.peek_else() {
            return Ok((program, None));
        }
        let else_start = self.here();
        self.advance_bytes_no_newline("{{else".len());
        self.consume_whitespace();
        if self.consume("}}") {
            let inverse_start = self.here();
            let inverse_body = self.parse_nodes()?;
            if self.peek_else() {
                return Err(self.make_error(ParseErrorKind::Expected {
                    description: "'{{/', found a second '{{else}}'".to_string(),
                }));
            }
            let inverse = Root {
                body: inverse_body,
                span: Span::new(inverse_start, self.here()),
            };
            return Ok((program, Some(inverse)));
        }
        let (path, params, hash) = self.parse_call("}}")?;
        let block_params = self.parse_block_params()?;
        self.consume_whitespace();
        self.expect("}}")?;
        let (chained_program, chained_inverse) = self.parse_block_bodies()?;
        let span = Span::new(else_start, self.here());
        let nested = Node::Block(BlockStatement {
            path,
            params,
            hash,
            program: chained_program,
            inverse: chained_inverse,
            block_params,
            span,
        });
        let inverse = Root {
            body: vec![nested],
            span,
        };
        Ok((program, Some(inverse)))
    }

    fn consume_tag_name(&mut self) -> ParseResult<&'a str> {
        let start = self.pos;
        if !self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(self.make_error(ParseErrorKind::Expected {
                description: format!("tag name, found '{}'", self.lookahead_snippet()),
            }));
        }
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_alphanumeric() || matches!(current_char, '-' | '_' | '.' | ':')
            {
                self.advance_bytes_no_newline(current_char.len_utf8());
            } else {
                break;
            }
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_element(&mut self) -> ParseResult<Node<'a>> {
        let start = self.here();
        self.expect("<")?;
        let tag = self.consume_tag_name()?;
        let mut attributes = Vec::new();
        let mut modifiers = Vec::new();
        let mut comments = Vec::new();
        let mut block_params = Vec::new();
        let mut self_closing = false;
        loop {
            self.consume_whitespace();
            if self.eof() {
                return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(">".to_string()))));
            }
            if self.consume("/>") {
                self_closing = true;
                break;
            }
            if self.consume(">") {
                break;
            }
            if self.peek("{{!") {
                comments.push(self.parse_mustache_comment()?);
            } else if self.peek("{{") {
                modifiers.push(Node::ElementModifier(self.parse_mustache_statement()?));
            } else if self.peek_n(["as", "|"]) {
                block_params = self.parse_block_params()?;
            } else {
                attributes.push(self.parse_attribute()?);
            }
        }

        let children = if self_closing || VOID_TAGS.contains(&tag) {
            Vec::new()
        } else {
            let children = self.parse_nodes()?;
            self.expect("</")?;
            self.consume_whitespace();
            let close_name = self.consume_tag_name()?;
            self.consume_whitespace();
            self.expect(">")?;
            if close_name != tag {
                return Err(self.make_error(ParseErrorKind::MismatchedClosingTag {
                    expected: tag.to_string(),
                    found: close_name.to_string(),
                }));
            }
            children
        };

        Ok(Node::Element(ElementNode {
            tag,
            attributes,
            modifiers,
            comments,
            block_params,
            children,
            span: Span::new(start, self.here()),
        }))
    }

    fn consume_attr_name(&mut self) -> ParseResult<&'a str> {
        let start = self.pos;
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_whitespace()
                || matches!(current_char, '=' | '>' | '/' | '"' | '\'' | '<' | '`')
            {
                break;
            }
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        if start == self.pos {
            Err(self.make_error(ParseErrorKind::Expected {
                description: format!("attribute name, found '{}'", self.lookahead_snippet()),
            }))
        } else {
            Ok(&self.input[start..self.pos])
        }
    }

    fn parse_attribute(&mut self) -> ParseResult<AttrNode<'a>> {
        let name = self.consume_attr_name()?;
        // Markup tolerates whitespace around `=`, but a bare name followed
        // by another attribute must not swallow it.
        let checkpoint = (self.pos, self.line, self.line_start_pos);
        self.consume_whitespace();
        if !self.consume("=") {
            (self.pos, self.line, self.line_start_pos) = checkpoint;
            // Boolean-style attribute: the value is a zero-width text node.
            let at = self.here();
            return Ok(AttrNode {
                name,
                value: Node::Text(TextNode {
                    chars: "",
                    span: Span::collapsed(at),
                }),
                value_span: Span::collapsed(at),
            });
        }
        self.consume_whitespace();
        if let Some(delimiter @ ('"' | '\'')) = self.peek_char() {
            let (value, value_span) = self.parse_quoted_attr_value(delimiter)?;
            return Ok(AttrNode {
                name,
                value,
                value_span,
            });
        }
        if self.peek("{{") {
            let mustache = self.parse_mustache_statement()?;
            let value_span = mustache.span;
            return Ok(AttrNode {
                name,
                value: Node::Mustache(mustache),
                value_span,
            });
        }
        // Unquoted value: a bare token up to whitespace or the tag end.
        let value_start = self.here();
        while let Some(current_char) = self.peek_char() {
            if current_char.is_ascii_whitespace() || current_char == '>' || self.peek("/>") {
                break;
            }
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        let value_span = Span::new(value_start, self.here());
        Ok(AttrNode {
            name,
            value: Node::Text(TextNode {
                chars: &self.input[value_start.offset..self.pos],
                span: value_span,
            }),
            value_span,
        })
    }

    /// A quoted attribute value. Text mixed with mustaches becomes a concat
    /// node; a mustache that is the whole value stays a bare mustache. The
    /// returned span covers the delimiters, so even an empty value is never
    /// zero-width and cannot be mistaken for a boolean attribute.
    fn parse_quoted_attr_value(&mut self, delimiter: char) -> ParseResult<(Node<'a>, Span)> {
        let value_start = self.here();
        self.advance_bytes_no_newline(delimiter.len_utf8());
        let mut parts: Vec<Node<'a>> = Vec::new();
        let mut text_start = self.here();
        loop {
            let Some(current_char) = self.peek_char() else {
                return Err(self.make_error(ParseErrorKind::unexpected_eof(Some(
                    delimiter.to_string(),
                ))));
            };
            if current_char == delimiter {
                break;
            }
            if self.peek("{{") {
                if self.pos > text_start.offset {
                    parts.push(Node::Text(TextNode {
                        chars: &self.input[text_start.offset..self.pos],
                        span: Span::new(text_start, self.here()),
                    }));
                }
                parts.push(Node::Mustache(self.parse_mustache_statement()?));
                text_start = self.here();
                continue;
            }
            self.advance_by_char(current_char, current_char.len_utf8());
        }
        if self.pos > text_start.offset {
            parts.push(Node::Text(TextNode {
                chars: &self.input[text_start.offset..self.pos],
                span: Span::new(text_start, self.here()),
            }));
        }
        self.advance_bytes_no_newline(delimiter.len_utf8());
        let value_span = Span::new(value_start, self.here());

        let value = if parts.is_empty() {
            Node::Text(TextNode {
                chars: "",
                span: value_span,
            })
        } else if parts.len() == 1 {
            parts.swap_remove(0)
        } else {
            Node::Concat(ConcatStatement { parts })
        };
        Ok((value, value_span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! path {
        ($name:expr) => {
            Expression::Path(PathExpression { original: $name })
        };
    }

    fn parse_one(input: &str) -> Node<'_> {
        let root = parse(input).unwrap();
        assert_eq!(root.body.len(), 1, "expected exactly one node");
        root.body.into_iter().next().unwrap()
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_text_and_mustache() {
        let root = parse("Hello, {{name}}!").unwrap();
        assert_eq!(root.body.len(), 3);
        match &root.body[0] {
            Node::Text(t) => assert_eq!(t.chars, "Hello, "),
            other => panic!("expected text, got {:?}", other),
        }
        match &root.body[1] {
            Node::Mustache(m) => {
                assert_eq!(m.path, path!("name"));
                assert!(m.escaped);
            }
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_triple_mustache_is_unescaped() {
        match parse_one("{{{raw.html}}}") {
            Node::Mustache(m) => {
                assert_eq!(m.path, path!("raw.html"));
                assert!(!m.escaped);
            }
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_mustache_params_and_hash() {
        match parse_one("{{t \"greeting\" count=2 loud=true}}") {
            Node::Mustache(m) => {
                assert_eq!(m.path, path!("t"));
                assert_eq!(
                    m.params,
                    vec![Expression::String(StringLiteral {
                        value: Cow::Borrowed("greeting")
                    })]
                );
                assert_eq!(m.hash.pairs.len(), 2);
                assert_eq!(m.hash.pairs[0].key, "count");
                assert_eq!(
                    m.hash.pairs[0].value,
                    Expression::Number(NumberLiteral { value: 2.0 })
                );
                assert_eq!(
                    m.hash.pairs[1].value,
                    Expression::Boolean(BooleanLiteral { value: true })
                );
            }
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_sub_expression() {
        match parse_one("{{join (concat a b) sep=\",\"}}") {
            Node::Mustache(m) => match &m.params[0] {
                Expression::SubExpression(sub) => {
                    assert_eq!(*sub.path, path!("concat"));
                    assert_eq!(sub.params, vec![path!("a"), path!("b")]);
                }
                other => panic!("expected subexpression, got {:?}", other),
            },
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_null_and_undefined_literals() {
        match parse_one("{{check null undefined}}") {
            Node::Mustache(m) => {
                assert_eq!(m.params, vec![Expression::Null, Expression::Undefined]);
            }
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_string_escape_of_active_quote_is_decoded() {
        match parse_one("{{t \"say \\\"hi\\\"\"}}") {
            Node::Mustache(m) => {
                assert_eq!(
                    m.params[0],
                    Expression::String(StringLiteral {
                        value: Cow::Owned("say \"hi\"".to_string())
                    })
                );
            }
            other => panic!("expected mustache, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_both_comment_styles() {
        let root = parse("{{!-- long --}}{{! short }}<!-- markup -->").unwrap();
        assert_eq!(root.body.len(), 3);
        match &root.body[0] {
            Node::MustacheComment(c) => assert_eq!(c.value, " long "),
            other => panic!("expected mustache comment, got {:?}", other),
        }
        match &root.body[1] {
            Node::MustacheComment(c) => assert_eq!(c.value, " short "),
            other => panic!("expected mustache comment, got {:?}", other),
        }
        match &root.body[2] {
            Node::Comment(c) => assert_eq!(c.value, " markup "),
            other => panic!("expected markup comment, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_element_with_attributes() {
        match parse_one("<a href=\"/home\" target='_blank' download>x</a>") {
            Node::Element(el) => {
                assert_eq!(el.tag, "a");
                assert_eq!(el.attributes.len(), 3);
                assert_eq!(el.attributes[0].name, "href");
                match &el.attributes[0].value {
                    Node::Text(t) => assert_eq!(t.chars, "/home"),
                    other => panic!("expected text value, got {:?}", other),
                }
                // A bare attribute has a zero-width value span.
                assert!(el.attributes[2].value_span.is_zero_width());
                assert_eq!(el.children.len(), 1);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_void_tag_needs_no_close() {
        let root = parse("<img src=\"a.png\"><br>").unwrap();
        assert_eq!(root.body.len(), 2);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_concat_attribute_value() {
        match parse_one("<div class=\"btn {{kind}} large\"></div>") {
            Node::Element(el) => match &el.attributes[0].value {
                Node::Concat(concat) => {
                    assert_eq!(concat.parts.len(), 3);
                    assert!(matches!(concat.parts[1], Node::Mustache(_)));
                }
                other => panic!("expected concat value, got {:?}", other),
            },
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_whole_mustache_attribute_value_stays_bare() {
        match parse_one("<div class=\"{{kind}}\"></div>") {
            Node::Element(el) => {
                assert!(matches!(el.attributes[0].value, Node::Mustache(_)));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_element_modifiers_and_comments() {
        match parse_one("<button {{on \"click\" go}} {{!-- why --}} as |btn|></button>") {
            Node::Element(el) => {
                assert_eq!(el.modifiers.len(), 1);
                assert!(matches!(el.modifiers[0], Node::ElementModifier(_)));
                assert_eq!(el.comments.len(), 1);
                assert_eq!(el.block_params, vec!["btn"]);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_block_with_else() {
        match parse_one("{{#if ok}}yes{{else}}no{{/if}}") {
            Node::Block(block) => {
                assert_eq!(block.path, path!("if"));
                assert_eq!(block.program.body.len(), 1);
                let inverse = block.inverse.expect("should have an inverse branch");
                assert_eq!(inverse.body.len(), 1);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_else_if_parses_as_nested_block_in_inverse() {
        match parse_one("{{#if a}}X{{else if b}}Y{{else}}Z{{/if}}") {
            Node::Block(block) => {
                let inverse = block.inverse.expect("chained else should be an inverse");
                assert_eq!(inverse.body.len(), 1);
                match &inverse.body[0] {
                    Node::Block(nested) => {
                        assert_eq!(nested.path, path!("if"));
                        assert_eq!(nested.params, vec![path!("b")]);
                        assert!(nested.inverse.is_some(), "trailing else belongs to the chain");
                    }
                    other => panic!("expected nested block, got {:?}", other),
                }
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_each_with_block_params() {
        match parse_one("{{#each items as |item index|}}{{item}}{{/each}}") {
            Node::Block(block) => {
                assert_eq!(block.path, path!("each"));
                assert_eq!(block.block_params, vec!["item", "index"]);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_elsewhere_is_not_an_else_keyword() {
        match parse_one("{{#if a}}{{elsewhere}}{{/if}}") {
            Node::Block(block) => {
                assert!(block.inverse.is_none());
                assert_eq!(block.program.body.len(), 1);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_mismatched_block_close_is_an_error() {
        let err = parse("{{#if a}}x{{/each}}").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::MismatchedClosingTag { .. }
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_mismatched_element_close_is_an_error() {
        let err = parse("<div>x</span>").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::MismatchedClosingTag { .. }
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unterminated_mustache_reports_position() {
        let err = parse("line one\n{{oops").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_stray_close_tag_is_an_error() {
        let err = parse("</div>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Expected { .. }));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_lone_angle_bracket_is_text() {
        let root = parse("a < b and {{c}}").unwrap();
        match &root.body[0] {
            Node::Text(t) => assert_eq!(t.chars, "a < b and "),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_element_spans_cover_the_whole_element() {
        let input = "  <div>x</div>";
        let root = parse(input).unwrap();
        match &root.body[1] {
            Node::Element(el) => {
                assert_eq!(
                    &input[el.span.start.offset..el.span.end.offset],
                    "<div>x</div>"
                );
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_component_tags_parse() {
        match parse_one("<Foo.Bar @title={{title}} />") {
            Node::Element(el) => {
                assert_eq!(el.tag, "Foo.Bar");
                assert_eq!(el.attributes[0].name, "@title");
                assert!(el.children.is_empty());
            }
            other => panic!("expected element, got {:?}", other),
        }
    }
}
