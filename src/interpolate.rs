//! Binding a data context into a (cloned) template tree: loop
//! expansion, conditional pruning and placeholder substitution.
//!
//! Nothing in here fails. Data that doesn't fit the template just
//! produces less output: missing paths become empty strings or false
//! conditionals, and a repetition anchor over something that isn't an
//! array disappears.

use chj_util::trace;
use jxdom::{Tree, NodeId, Node};
use kstring::KString;

use crate::{markers::Markers,
            placeholder::substitute,
            resolve::{resolve, is_identity_path},
            value::{Value, is_truthy}};

/// The text a placeholder with `path` is replaced with.
fn lookup_string(context: &Value, path: &str) -> String {
    match resolve(context, path) {
        None | Some(Value::Null) => String::new(),
        Some(v) => v.to_display_string(),
    }
}

fn substitute_kstring(s: &mut KString, context: &Value) {
    if let Some(new) = substitute(s.as_str(), |path| lookup_string(context, path)) {
        *s = KString::from_string(new);
    }
}

/// Bind `context` into the subtree at `id`, in place. `tree` must be
/// a pass-local copy, never the registered template itself.
///
/// Order per node: a repetition anchor is expanded (and nothing else
/// is done with it); otherwise text or attribute placeholders are
/// substituted, then a conditional is evaluated (removing the node
/// when false), then the children are processed with the same
/// context.
pub fn interpolate(tree: &mut Tree, id: NodeId, context: &Value, markers: &Markers) {
    let each_path = tree.element(id).and_then(|e| e.get_attribute(&markers.each)).cloned();
    if let Some(path) = each_path {
        expand_loop(tree, id, &path, context, markers);
        return;
    }

    match tree.node_mut(id) {
        Node::Text(s) => substitute_kstring(s, context),
        Node::Element(e) =>
            for (_, v) in e.attr.iter_mut() {
                substitute_kstring(v, context);
            },
        Node::Fragment | Node::Comment(_) => (),
    }

    if let Some(e) = tree.element_mut(id) {
        if let Some(path) = e.remove_attribute(&markers.cond) {
            if !is_truthy(resolve(context, &path)) {
                tree.detach(id);
                return;
            }
        }
    }

    // Snapshot: loop clones inserted by expanding a child are already
    // done and must not be walked again.
    let children = tree.children(id).to_vec();
    for child in children {
        interpolate(tree, child, context, markers);
    }
}

/// Replace the anchor at `id` by one interpolated copy per element of
/// the array at `path`, each bound to its element.
fn expand_loop(tree: &mut Tree, id: NodeId, path: &str, context: &Value, markers: &Markers) {
    let items = match resolve(context, path) {
        Some(Value::Array(items)) => items,
        other => {
            trace!("{}={path:?} is {}, not an array; dropping the element",
                   markers.each,
                   match other {
                       None => "undefined",
                       Some(_) if is_identity_path(path) => "the context itself",
                       Some(_) => "a non-array value",
                   });
            tree.detach(id);
            return;
        }
    };

    let proto = tree.clone_subtree(id);
    if let Some(e) = tree.element_mut(proto) {
        e.remove_attribute(&markers.each);
        if let Some(cond) = e.remove_attribute(&markers.cond) {
            trace!("{}={cond:?} on a {} anchor is never evaluated",
                   markers.cond, markers.each);
        }
    }
    let parent = tree.parent(id);
    let next = tree.next_sibling(id);
    tree.detach(id);

    let parent = match parent {
        Some(p) => p,
        // A detached anchor has nowhere to put its copies.
        None => return,
    };
    let mut copies = Vec::with_capacity(items.len());
    for item in items {
        let copy = tree.clone_subtree(proto);
        interpolate(tree, copy, item, markers);
        copies.push(copy);
    }
    tree.insert_all_before(parent, &copies, next);
}

/// One render pass: copy `template` and bind `context` into the copy.
/// `template` itself is left untouched.
pub fn render_tree(template: &Tree, context: &Value, markers: &Markers) -> Tree {
    let mut tree = template.clone();
    let root = tree.root();
    interpolate(&mut tree, root, context, markers);
    tree
}
