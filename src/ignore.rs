//! "Do not reformat" regions.
//!
//! A mustache comment can mark the nodes after it as off-limits: a bare
//! `prettier-ignore` protects the next non-whitespace sibling, a
//! `prettier-ignore-start` / `prettier-ignore-end` pair protects everything
//! between the markers, and a leading `prettier-ignore-file` comment
//! protects the whole template. Protected nodes are reproduced verbatim
//! from the original source.

use crate::ast::{Node, Root};
use crate::printer::Ctx;
use crate::whitespace::is_whitespace_node;

const IGNORE: &str = "prettier-ignore";
const IGNORE_PREFIXED: &str = "prettier-ignore-";
const IGNORE_START: &str = "prettier-ignore-start";
const IGNORE_END: &str = "prettier-ignore-end";
const IGNORE_FILE: &str = "prettier-ignore-file";

fn comment_text<'a>(node: &Node<'a>) -> Option<&'a str> {
    match node {
        Node::MustacheComment(c) => Some(c.value.trim()),
        Node::Element(_)
        | Node::Block(_)
        | Node::Mustache(_)
        | Node::ElementModifier(_)
        | Node::Text(_)
        | Node::Comment(_)
        | Node::Concat(_) => None,
    }
}

/// A single-node marker: `prettier-ignore` but not `prettier-ignore-start`
/// or any other suffixed form.
fn is_single_marker(text: &str) -> bool {
    text.starts_with(IGNORE) && !text.starts_with(IGNORE_PREFIXED)
}

/// True when the node at `ctx` sits inside an ignore region and must be
/// copied from the original source instead of being reformatted.
pub(crate) fn is_ignored(ctx: &Ctx<'_>) -> bool {
    let preceding = &ctx.siblings[..ctx.index];

    // Single-node ignore: the nearest preceding non-whitespace sibling is a
    // bare marker comment.
    for node in preceding.iter().rev() {
        if is_whitespace_node(node) {
            continue;
        }
        if comment_text(node).is_some_and(is_single_marker) {
            return true;
        }
        break;
    }

    // Region ignore: the most recent start/end marker before this node is a
    // start with no matching end.
    for node in preceding.iter().rev() {
        if let Some(text) = comment_text(node) {
            if text.starts_with(IGNORE_END) {
                return false;
            }
            if text.starts_with(IGNORE_START) {
                return true;
            }
        }
    }
    false
}

/// True when the whole template is marked verbatim by a leading
/// `prettier-ignore-file` comment.
pub(crate) fn is_ignored_file(root: &Root<'_>) -> bool {
    root.body
        .first()
        .and_then(comment_text)
        .is_some_and(|text| text.starts_with(IGNORE_FILE))
}
