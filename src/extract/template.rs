//! Content-template extraction: the fixed leading/trailing blocks of a
//! sample document.
//!
//! The thresholds below are tuned against meeting-minutes and request
//! documents; organizations with different conventions should revisit them
//! against their own corpus.

use crate::model::{ContentTemplate, DocumentNode};
use crate::text::{is_dispatch_line, is_signer_line, is_suffix_marker};

/// Leading block cap: the 20 nodes closest to the body start are kept.
const MAX_LEADING_NODES: usize = 20;
/// Trailing block cap: the 20 nodes closest to the document end are kept.
const MAX_TRAILING_NODES: usize = 20;
/// Only this many nodes at the end are scanned for a suffix marker.
const SUFFIX_SCAN_WINDOW: usize = 20;

/// Minimum lengths (in chars) for the sentence-shape tests.
const MIN_LEN_FULL_STOP: usize = 10;
const MIN_LEN_COLON: usize = 20;
const MIN_LEN_COMMA: usize = 16;

/// A paragraph that reads like real body prose rather than letterhead or
/// field scaffolding.
fn looks_like_sentence(text: &str) -> bool {
    let len = text.chars().count();
    let ends_with = |set: &[char]| text.chars().last().map(|c| set.contains(&c)).unwrap_or(false);

    (ends_with(&['。', '！', '？', '!', '?']) && len >= MIN_LEN_FULL_STOP)
        || (ends_with(&['：', ':']) && len >= MIN_LEN_COLON)
        || ((text.contains('，') || text.contains(',')) && len >= MIN_LEN_COMMA)
}

/// Index of the first node that starts the real body: a heading, or a
/// sentence-shaped paragraph that is not itself a suffix marker.
pub(crate) fn body_start_index(nodes: &[DocumentNode]) -> Option<usize> {
    nodes.iter().position(|node| match node {
        DocumentNode::Heading { .. } => true,
        DocumentNode::Paragraph { .. } => {
            let text = node.plain_text();
            let text = text.trim();
            looks_like_sentence(text) && !is_suffix_marker(text)
        }
        _ => false,
    })
}

/// Index of the first suffix-marker paragraph within the scan window at the
/// end of the document.
pub(crate) fn suffix_start_index(nodes: &[DocumentNode]) -> Option<usize> {
    let window_start = nodes.len().saturating_sub(SUFFIX_SCAN_WINDOW);
    ((window_start)..nodes.len()).find(|&i| {
        matches!(nodes[i], DocumentNode::Paragraph { .. })
            && is_suffix_marker(nodes[i].plain_text().trim())
    })
}

fn keep_tail(mut nodes: Vec<DocumentNode>, cap: usize) -> Vec<DocumentNode> {
    if nodes.len() > cap {
        nodes.drain(..nodes.len() - cap);
    }
    nodes
}

/// Insert a red divider after the signer line of the leading block unless
/// one already follows it.
fn insert_leading_dividers(leading: &mut Vec<DocumentNode>) {
    if let Some(i) = leading
        .iter()
        .position(|n| is_signer_line(n.plain_text().trim()))
    {
        let already = leading.get(i + 1).map(|n| n.is_divider()).unwrap_or(false);
        if !already {
            leading.insert(i + 1, DocumentNode::divider());
        }
    }
}

/// Bound the dispatch (发送/发至/发文) line of the trailing block with red
/// dividers on both sides.
fn insert_trailing_dividers(trailing: &mut Vec<DocumentNode>) {
    if let Some(i) = trailing
        .iter()
        .position(|n| is_dispatch_line(n.plain_text().trim()))
    {
        let after = trailing.get(i + 1).map(|n| n.is_divider()).unwrap_or(false);
        if !after {
            trailing.insert(i + 1, DocumentNode::divider());
        }
        let before = i > 0 && trailing[i - 1].is_divider();
        if !before {
            trailing.insert(i, DocumentNode::divider());
        }
    }
}

/// Extract the content template from one sample's node list.
///
/// The leading block is everything before the body start; the trailing
/// block runs from the first suffix marker near the end. When no body start
/// is found but a suffix exists past index 0, everything before the suffix
/// becomes the leading block — this keeps a fixed letterhead-like prologue
/// even when the real body text lives in a container the reader cannot see
/// into (a text box, say). A sample producing neither block yields no
/// template.
pub(crate) fn extract_content_template(nodes: &[DocumentNode]) -> Option<ContentTemplate> {
    let body_start = body_start_index(nodes);
    let suffix_start = suffix_start_index(nodes);

    let (leading_end, trailing_start) = match (body_start, suffix_start) {
        (Some(bs), Some(ss)) if ss >= bs => (bs, Some(ss)),
        (Some(bs), _) => (bs, None),
        (None, Some(ss)) if ss > 0 => (ss, Some(ss)),
        _ => return None,
    };

    let mut leading = keep_tail(nodes[..leading_end].to_vec(), MAX_LEADING_NODES);
    let mut trailing = match trailing_start {
        Some(ss) => keep_tail(nodes[ss..].to_vec(), MAX_TRAILING_NODES),
        None => Vec::new(),
    };

    if leading.is_empty() && trailing.is_empty() {
        return None;
    }

    insert_leading_dividers(&mut leading);
    insert_trailing_dividers(&mut trailing);

    Some(ContentTemplate {
        leading_nodes: leading,
        trailing_nodes: trailing,
        body_placeholder: ContentTemplate::default_placeholder(),
    })
}
