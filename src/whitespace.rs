//! Text-node significance rules.
//!
//! Whitespace in a template is semantically meaningful, so text nodes cannot
//! simply be reflowed. Instead the leading and trailing whitespace runs of a
//! text node are replaced (by nothing, or by a single space) based on what
//! its neighbouring siblings are, and the interior passes through untouched.

use std::borrow::Cow;

use crate::ast::{Node, TextNode};
use crate::printer::{Ctx, Parent};

pub(crate) fn is_all_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// A statement node that prints as (at most) whitespace: a whitespace-only
/// text node.
pub(crate) fn is_whitespace_node(node: &Node<'_>) -> bool {
    matches!(node, Node::Text(t) if is_all_whitespace(t.chars))
}

/// Compute the printed form of a text node. An empty result means the node
/// is dropped from its parent's printed children entirely.
pub(crate) fn classify<'a>(node: &TextNode<'a>, ctx: &Ctx<'a>) -> Cow<'a, str> {
    let chars = node.chars;
    let prev = ctx.index.checked_sub(1).map(|i| &ctx.siblings[i]);
    let next = ctx.siblings.get(ctx.index + 1);

    // A whitespace-only node collapses to a single space when it sits
    // between rendered inline output, and is dropped everywhere else.
    if is_all_whitespace(chars) {
        if next.is_some() && matches!(prev, Some(Node::Mustache(_)) | Some(Node::Text(_))) {
            return Cow::Borrowed(" ");
        }
        return Cow::Borrowed("");
    }

    let has_leading = chars.starts_with(char::is_whitespace);
    let has_trailing = chars.ends_with(char::is_whitespace);

    // An edge whitespace run survives as one space when the neighbour on
    // that side renders inline. Concat parts can only neighbour mustaches.
    let in_concat = matches!(ctx.parent, Parent::Concat);
    let leading_forced = if in_concat {
        matches!(prev, Some(n) if n.is_mustache())
    } else {
        matches!(prev, Some(Node::Mustache(_)) | Some(Node::Element(_)))
    };
    let trailing_forced = if in_concat {
        matches!(next, Some(n) if n.is_mustache())
    } else {
        matches!(next, Some(Node::Mustache(_)) | Some(Node::Element(_)))
    };
    let leading = if has_leading && leading_forced { " " } else { "" };
    let trailing = if has_trailing && trailing_forced { " " } else { "" };

    let interior = chars.trim();
    if leading.is_empty() && trailing.is_empty() {
        return Cow::Borrowed(interior);
    }
    let mut out = String::with_capacity(leading.len() + interior.len() + trailing.len());
    out.push_str(leading);
    out.push_str(interior);
    out.push_str(trailing);
    Cow::Owned(out)
}
