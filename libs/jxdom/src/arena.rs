//! The node storage: all nodes of a tree live in one `Vec`, linked
//! to their parent and children by index. Detached nodes stay in the
//! storage (they are just not reachable from the root anymore) until
//! `compact` drops them.

use kstring::KString;

use crate::myfrom::MyFrom;

/// Index of a node within its `Tree`. Only meaningful for the tree
/// that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: KString,
    pub attr: Vec<(KString, KString)>,
}

impl Element {
    pub fn get_attribute(&self, name: &str) -> Option<&KString> {
        self.attr.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Replaces the value in place if the attribute exists (keeping
    /// its position), appends it otherwise.
    pub fn set_attribute<K, V>(&mut self, name: K, value: V)
    where KString: MyFrom<K> + MyFrom<V>
    {
        let name = KString::myfrom(name);
        let value = KString::myfrom(value);
        if let Some(slot) = self.attr.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attr.push((name, value));
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<KString> {
        let i = self.attr.iter().position(|(k, _)| k == name)?;
        Some(self.attr.remove(i).1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The root of every tree; prints as just its children.
    Fragment,
    Element(Element),
    Text(KString),
    Comment(KString),
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding just the (empty) fragment root.
    pub fn new() -> Self {
        Tree {
            slots: vec![Slot { node: Node::Fragment, parent: None, children: Vec::new() }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn slot(&self, id: NodeId) -> &Slot {
        self.slots.get(id.index()).unwrap_or_else(
            || panic!("NodeId {id:?} does not belong to this tree"))
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        self.slots.get_mut(id.index()).unwrap_or_else(
            || panic!("NodeId {id:?} does not belong to this tree"))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.slot(id).node
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slot_mut(id).node
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.node(id) {
            Node::Element(e) => Some(e),
            _ => None
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.node_mut(id) {
            Node::Element(e) => Some(e),
            _ => None
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    /// Allocate a new, detached node.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).expect(
            "more than u32::MAX nodes in a tree"));
        self.slots.push(Slot { node, parent: None, children: Vec::new() });
        id
    }

    pub fn new_element<T>(&mut self, tag: T, attr: Vec<(KString, KString)>) -> NodeId
    where KString: MyFrom<T>
    {
        self.push(Node::Element(Element { tag: KString::myfrom(tag), attr }))
    }

    pub fn new_text<T>(&mut self, s: T) -> NodeId
    where KString: MyFrom<T>
    {
        self.push(Node::Text(KString::myfrom(s)))
    }

    pub fn new_comment<T>(&mut self, s: T) -> NodeId
    where KString: MyFrom<T>
    {
        self.push(Node::Comment(KString::myfrom(s)))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let i = siblings.iter().position(|c| *c == id)?;
        siblings.get(i + 1).copied()
    }

    /// Remove `id` from its parent's children. The subtree below `id`
    /// stays intact and can be re-inserted elsewhere. No-op for
    /// detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slot_mut(id).parent.take() {
            self.slot_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Insert `child` into `parent` right before `before`, or at the
    /// end if `before` is `None` (or is not a child of `parent`
    /// anymore). `child` is detached from its previous place first.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        assert_ne!(parent, child, "can't insert a node into itself");
        self.detach(child);
        let children = &mut self.slot_mut(parent).children;
        let pos = before.and_then(|b| children.iter().position(|c| *c == b));
        match pos {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
        self.slot_mut(child).parent = Some(parent);
    }

    /// Insert the detached nodes `new` into `parent`, in order, right
    /// before `before` (or at the end, as with `insert_before`). One
    /// splice, however many nodes.
    pub fn insert_all_before(&mut self, parent: NodeId, new: &[NodeId], before: Option<NodeId>) {
        for child in new {
            assert_ne!(parent, *child, "can't insert a node into itself");
            assert!(self.slot(*child).parent.is_none(), "node {child:?} is still attached");
            self.slot_mut(*child).parent = Some(parent);
        }
        let children = &mut self.slot_mut(parent).children;
        let pos = before.and_then(|b| children.iter().position(|c| *c == b))
            .unwrap_or(children.len());
        children.splice(pos..pos, new.iter().copied());
    }

    /// `detach` for many nodes, with one pass over each parent's
    /// children.
    pub fn detach_all(&mut self, ids: &[NodeId]) {
        let mut parents = Vec::new();
        for id in ids {
            if let Some(parent) = self.slot_mut(*id).parent.take() {
                parents.push(parent);
            }
        }
        parents.sort();
        parents.dedup();
        for parent in parents {
            let mut children = std::mem::take(&mut self.slot_mut(parent).children);
            children.retain(|c| self.slot(*c).parent == Some(parent));
            self.slot_mut(parent).children = children;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None)
    }

    /// Deep copy of the subtree at `id` within this tree; the copy is
    /// detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.node(id).clone();
        let copy = self.push(node);
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.slot_mut(child_copy).parent = Some(copy);
            self.slot_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Deep copy of the subtree at `id` in `other` into this tree;
    /// the copy is detached.
    pub fn import_subtree(&mut self, other: &Tree, id: NodeId) -> NodeId {
        let copy = self.push(other.node(id).clone());
        for child in other.children(id) {
            let child_copy = self.import_subtree(other, *child);
            self.slot_mut(child_copy).parent = Some(copy);
            self.slot_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Copy the children of `other`'s root into this tree, inserting
    /// them into `parent` before `before`. Returns the new nodes in
    /// document order.
    pub fn insert_tree_before(
        &mut self,
        parent: NodeId,
        other: &Tree,
        before: Option<NodeId>,
    ) -> Vec<NodeId> {
        let inserted: Vec<NodeId> = other.children(other.root()).iter()
            .map(|child| self.import_subtree(other, *child))
            .collect();
        self.insert_all_before(parent, &inserted, before);
        inserted
    }

    /// Replace all children of `parent` with copies of the top-level
    /// nodes of `other`.
    pub fn replace_children(&mut self, parent: NodeId, other: &Tree) -> Vec<NodeId> {
        let old = self.children(parent).to_vec();
        self.detach_all(&old);
        self.insert_tree_before(parent, other, None)
    }

    /// All nodes below `id` (excluding `id` itself), in document
    /// order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    pub fn find_element_by_id(&self, idval: &str) -> Option<NodeId> {
        self.descendants(self.root()).find(
            |n| self.element(*n).and_then(|e| e.get_attribute("id"))
                .map_or(false, |v| v == idval))
    }

    /// `id` itself, then its ancestors up to the root.
    pub fn ancestors_or_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.parent(*n))
    }

    /// The concatenated text of all text nodes below (and including)
    /// `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Node::Text(s) = self.node(id) {
            out.push_str(s);
        }
        for n in self.descendants(id) {
            if let Node::Text(s) = self.node(n) {
                out.push_str(s);
            }
        }
        out
    }
}

impl Tree {
    /// Number of allocated nodes, detached ones included.
    pub fn allocated_len(&self) -> usize {
        self.slots.len()
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn live_len(&self) -> usize {
        1 + self.descendants(self.root()).count()
    }

    /// Drop all nodes not reachable from the root. Ids handed out
    /// before are invalid afterwards; the returned map translates the
    /// ones that survived.
    pub fn compact(&mut self) -> NodeMap {
        let mut map = vec![None; self.slots.len()];
        let order: Vec<NodeId> = std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .collect();
        for (i, old) in order.iter().enumerate() {
            map[old.index()] = Some(NodeId(i as u32));
        }
        let mut old_slots: Vec<Option<Slot>> =
            std::mem::take(&mut self.slots).into_iter().map(Some).collect();
        self.slots = order.iter().map(|old| {
            let slot = old_slots[old.index()].take()
                .expect("each live node is visited once");
            Slot {
                node: slot.node,
                parent: slot.parent.and_then(|p| map[p.index()]),
                children: slot.children.iter().filter_map(|c| map[c.index()]).collect(),
            }
        }).collect();
        NodeMap(map)
    }
}

/// Old to new ids, from `Tree::compact`.
#[derive(Debug, Clone)]
pub struct NodeMap(Vec<Option<NodeId>>);

impl NodeMap {
    /// `None` if `id` was dropped (or never existed).
    pub fn get(&self, id: NodeId) -> Option<NodeId> {
        self.0.get(id.index()).copied().flatten()
    }
}

pub struct Descendants<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tree: &Tree, id: NodeId) -> Vec<String> {
        tree.children(id).iter().map(|c| match tree.node(*c) {
            Node::Element(e) => e.tag.to_string(),
            Node::Text(s) => format!("#{s}"),
            Node::Comment(_) => "!".into(),
            Node::Fragment => "fragment".into(),
        }).collect()
    }

    #[test]
    fn t_insert_before_and_detach() {
        let mut t = Tree::new();
        let root = t.root();
        let a = t.new_element("a", vec![]);
        let c = t.new_element("c", vec![]);
        t.append_child(root, a);
        t.append_child(root, c);
        let b = t.new_element("b", vec![]);
        t.insert_before(root, b, Some(c));
        assert_eq!(tags(&t, root), ["a", "b", "c"]);
        assert_eq!(t.next_sibling(a), Some(b));
        assert_eq!(t.next_sibling(c), None);

        t.detach(b);
        assert_eq!(tags(&t, root), ["a", "c"]);
        assert_eq!(t.parent(b), None);
        t.detach(b); // no-op

        // a `before` that is no longer a child appends
        t.insert_before(root, b, Some(b));
        assert_eq!(tags(&t, root), ["a", "c", "b"]);
    }

    #[test]
    fn t_clone_subtree_is_deep_and_detached() {
        let mut t = Tree::new();
        let root = t.root();
        let ul = t.new_element("ul", vec![]);
        let li = t.new_element("li", vec![]);
        let txt = t.new_text("x");
        t.append_child(root, ul);
        t.append_child(ul, li);
        t.append_child(li, txt);

        let copy = t.clone_subtree(ul);
        assert_eq!(t.parent(copy), None);
        assert_eq!(t.text_content(copy), "x");
        let li2 = t.children(copy)[0];
        assert_ne!(li2, li);
        assert_eq!(t.parent(li2), Some(copy));

        if let Node::Text(s) = t.node_mut(t.children(li2)[0]) {
            *s = "y".into();
        }
        assert_eq!(t.text_content(ul), "x");
        assert_eq!(t.text_content(copy), "y");
    }

    #[test]
    fn t_attributes() {
        let mut e = Element { tag: "a".into(), attr: Vec::new() };
        e.set_attribute("href", "/x");
        e.set_attribute("class", "k");
        e.set_attribute("href", "/y");
        assert_eq!(e.attr.len(), 2);
        assert_eq!(e.get_attribute("href").map(|v| v.as_str()), Some("/y"));
        assert_eq!(e.attr[0].0, "href");
        assert_eq!(e.remove_attribute("href").as_deref(), Some("/y"));
        assert_eq!(e.get_attribute("href"), None);
        assert_eq!(e.remove_attribute("href"), None);
    }

    #[test]
    fn t_descendants_order_and_lookup() {
        let mut t = Tree::new();
        let root = t.root();
        let div = t.new_element("div", vec![(KString::from_static("id"),
                                             KString::from_static("outer"))]);
        let p = t.new_element("p", vec![(KString::from_static("id"),
                                         KString::from_static("inner"))]);
        let s = t.new_element("span", vec![]);
        t.append_child(root, div);
        t.append_child(div, p);
        t.append_child(div, s);
        assert_eq!(t.descendants(root).collect::<Vec<_>>(), [div, p, s]);
        assert_eq!(t.find_element_by_id("inner"), Some(p));
        assert_eq!(t.find_element_by_id("nope"), None);
        assert_eq!(t.ancestors_or_self(p).collect::<Vec<_>>(), [p, div, root]);
    }

    fn texts(t: &Tree, parent: NodeId) -> Vec<String> {
        t.children(parent).iter().map(|c| t.text_content(*c)).collect()
    }

    #[test]
    fn t_insert_all_and_detach_all() {
        let mut t = Tree::new();
        let root = t.root();
        let ul = t.new_element("ul", vec![]);
        t.append_child(root, ul);
        let a = t.new_text("a");
        let z = t.new_text("z");
        t.append_child(ul, a);
        t.append_child(ul, z);
        let new: Vec<NodeId> = ["b", "c", "d"].iter().map(|s| t.new_text(*s)).collect();
        t.insert_all_before(ul, &new, Some(z));
        assert_eq!(texts(&t, ul), ["a", "b", "c", "d", "z"]);
        assert_eq!(t.parent(new[1]), Some(ul));

        let more = vec![t.new_text("y")];
        t.insert_all_before(ul, &more, None);
        assert_eq!(texts(&t, ul), ["a", "b", "c", "d", "z", "y"]);

        t.detach_all(&[new[0], new[2], z, new[0]]);
        assert_eq!(texts(&t, ul), ["a", "c", "y"]);
        assert_eq!(t.parent(z), None);
        // detached nodes can be inserted again
        t.insert_all_before(ul, &[z], Some(a));
        assert_eq!(texts(&t, ul), ["z", "a", "c", "y"]);
    }

    #[test]
    fn t_compact() {
        let mut t = Tree::new();
        let root = t.root();
        let div = t.new_element("div", vec![]);
        t.append_child(root, div);
        let gone = t.new_element("p", vec![]);
        let gone_text = t.new_text("gone");
        t.append_child(div, gone);
        t.append_child(gone, gone_text);
        let kept = t.new_text("kept");
        t.append_child(div, kept);
        t.detach(gone);
        let _never_attached = t.new_text("x");
        assert_eq!((t.allocated_len(), t.live_len()), (6, 3));

        let map = t.compact();
        assert_eq!((t.allocated_len(), t.live_len()), (3, 3));
        assert_eq!(map.get(root), Some(t.root()));
        assert_eq!(map.get(gone), None);
        assert_eq!(map.get(gone_text), None);
        let div2 = map.get(div).unwrap();
        let kept2 = map.get(kept).unwrap();
        assert_eq!(t.children(div2), [kept2]);
        assert_eq!(t.parent(kept2), Some(div2));
        assert_eq!(t.text_content(t.root()), "kept");
    }
}
