//! Canonical AST forms for equivalence checks.
//!
//! Formatting must never change what a template means. The canonical form
//! erases everything formatting is allowed to touch - source spans and
//! leading/trailing whitespace of text - so that the canonical form of the
//! input equals the canonical form of a re-parse of the output.

use crate::ast::{
    AttrNode, BlockStatement, CommentNode, ConcatStatement, ElementNode, Expression, Hash,
    HashPair, MustacheStatement, Node, Root, Span, SubExpression, TextNode,
};
use crate::whitespace::is_all_whitespace;

/// Produce the canonical form of a template body: spans zeroed, text nodes
/// trimmed, whitespace-only text nodes removed.
pub fn canonical<'a>(root: &Root<'a>) -> Root<'a> {
    Root {
        body: clean_nodes(&root.body),
        span: Span::default(),
    }
}

fn clean_nodes<'a>(nodes: &[Node<'a>]) -> Vec<Node<'a>> {
    nodes.iter().filter_map(clean_node).collect()
}

fn clean_node<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    match node {
        Node::Element(el) => Some(Node::Element(ElementNode {
            tag: el.tag,
            attributes: el.attributes.iter().map(clean_attr).collect(),
            modifiers: clean_nodes(&el.modifiers),
            comments: el.comments.iter().map(clean_comment).collect(),
            block_params: el.block_params.clone(),
            children: clean_nodes(&el.children),
            span: Span::default(),
        })),
        Node::Block(block) => Some(Node::Block(BlockStatement {
            path: clean_expression(&block.path),
            params: block.params.iter().map(clean_expression).collect(),
            hash: clean_hash(&block.hash),
            program: canonical(&block.program),
            inverse: block.inverse.as_ref().map(canonical),
            block_params: block.block_params.clone(),
            span: Span::default(),
        })),
        Node::Mustache(m) => Some(Node::Mustache(clean_mustache(m))),
        Node::ElementModifier(m) => Some(Node::ElementModifier(clean_mustache(m))),
        Node::Text(t) => {
            if is_all_whitespace(t.chars) {
                return None;
            }
            Some(Node::Text(TextNode {
                chars: t.chars.trim(),
                span: Span::default(),
            }))
        }
        Node::MustacheComment(c) => Some(Node::MustacheComment(clean_comment(c))),
        Node::Comment(c) => Some(Node::Comment(clean_comment(c))),
        Node::Concat(concat) => Some(Node::Concat(ConcatStatement {
            parts: clean_nodes(&concat.parts),
        })),
    }
}

fn clean_attr<'a>(attr: &AttrNode<'a>) -> AttrNode<'a> {
    let value = match clean_node(&attr.value) {
        Some(value) => value,
        // A whitespace-only value is equivalent to a boolean attribute.
        None => Node::Text(TextNode {
            chars: "",
            span: Span::default(),
        }),
    };
    AttrNode {
        name: attr.name,
        value,
        value_span: Span::default(),
    }
}

fn clean_mustache<'a>(m: &MustacheStatement<'a>) -> MustacheStatement<'a> {
    MustacheStatement {
        path: clean_expression(&m.path),
        params: m.params.iter().map(clean_expression).collect(),
        hash: clean_hash(&m.hash),
        escaped: m.escaped,
        span: Span::default(),
    }
}

fn clean_comment<'a>(c: &CommentNode<'a>) -> CommentNode<'a> {
    CommentNode {
        value: c.value,
        span: Span::default(),
    }
}

fn clean_hash<'a>(hash: &Hash<'a>) -> Hash<'a> {
    Hash {
        pairs: hash
            .pairs
            .iter()
            .map(|pair| HashPair {
                key: pair.key,
                value: clean_expression(&pair.value),
            })
            .collect(),
    }
}

fn clean_expression<'a>(expr: &Expression<'a>) -> Expression<'a> {
    match expr {
        Expression::SubExpression(sub) => Expression::SubExpression(SubExpression {
            path: Box::new(clean_expression(&sub.path)),
            params: sub.params.iter().map(clean_expression).collect(),
            hash: clean_hash(&sub.hash),
        }),
        Expression::Path(_)
        | Expression::String(_)
        | Expression::Number(_)
        | Expression::Boolean(_)
        | Expression::Undefined
        | Expression::Null => expr.clone(),
    }
}
