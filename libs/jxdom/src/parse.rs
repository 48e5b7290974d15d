//! Building a `Tree` from HTML source, via the html5gum tokenizer.

use anyhow::{Result, Context};
use chj_util::warn;
use html5gum::{Token, HtmlString};
use kstring::KString;

use crate::{arena::{Tree, NodeId, Node}, meta::is_void_element};

fn kstring(s: HtmlString) -> Result<KString> {
    let s = String::from_utf8(s.0).context("HTML token is not valid UTF-8")?;
    Ok(KString::from_string(s))
}

/// Append text to `parent`, merging with a directly preceding text
/// node (the tokenizer may split runs of characters).
fn push_text(tree: &mut Tree, parent: NodeId, s: KString) {
    if let Some(last) = tree.children(parent).last().copied() {
        if let Node::Text(prev) = tree.node_mut(last) {
            let mut joined = String::with_capacity(prev.len() + s.len());
            joined.push_str(prev);
            joined.push_str(&s);
            *prev = KString::from_string(joined);
            return;
        }
    }
    let id = tree.new_text(s);
    tree.append_child(parent, id);
}

/// Parse `html` as a fragment (no implicit `<html>`/`<body>`
/// wrapping). Unclosed elements are closed at the end of the input,
/// end tags without a matching open element are dropped, and
/// tokenizer errors are reported as warnings; only invalid UTF-8
/// leads to an error.
pub fn parse_html(html: &str) -> Result<Tree> {
    let mut tree = Tree::new();
    // The currently open elements, innermost last; the root is never
    // popped.
    let mut open: Vec<NodeId> = vec![tree.root()];
    for token in html5gum::Tokenizer::new(html).infallible() {
        let current = *open.last().expect("root is never popped");
        match token {
            Token::StartTag(starttag) => {
                let name = kstring(starttag.name)?;
                let mut attr = Vec::with_capacity(starttag.attributes.len());
                for (k, v) in starttag.attributes {
                    attr.push((kstring(k)?, kstring(v)?));
                }
                let void = is_void_element(&name);
                let id = tree.new_element(name, attr);
                tree.append_child(current, id);
                if !(void || starttag.self_closing) {
                    open.push(id);
                }
            }
            Token::EndTag(endtag) => {
                let name = kstring(endtag.name)?;
                let pos = open.iter().rposition(
                    |id| tree.element(*id).map_or(false, |e| e.tag == name));
                match pos {
                    // (never 0, the root is not an element)
                    Some(i) => open.truncate(i),
                    None => if !is_void_element(&name) {
                        warn!("dropping unmatched end tag </{name}>")
                    }
                }
            }
            Token::String(s) => push_text(&mut tree, current, kstring(s)?),
            Token::Comment(s) => {
                let id = tree.new_comment(kstring(s)?);
                tree.append_child(current, id);
            }
            Token::Doctype(_) => (),
            Token::Error(e) => warn!("HTML parsing: {e}"),
        }
    }
    Ok(tree)
}
