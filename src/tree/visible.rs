use super::node::TreeNode;

/// Address of a node in the forest: a root index plus an optional child
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub root: usize,
    pub child: Option<usize>,
}

impl NodeRef {
    pub fn root(root: usize) -> Self {
        Self { root, child: None }
    }

    pub fn child(root: usize, child: usize) -> Self {
        Self {
            root,
            child: Some(child),
        }
    }
}

/// Visible rows in display order: every root, followed by its children
/// when the root is expanded.
pub fn flatten(roots: &[TreeNode]) -> Vec<NodeRef> {
    let mut out = Vec::with_capacity(roots.len());
    for (i, root) in roots.iter().enumerate() {
        out.push(NodeRef::root(i));
        if root.expanded {
            out.extend((0..root.children.len()).map(|c| NodeRef::child(i, c)));
        }
    }
    out
}

pub fn resolve(roots: &[TreeNode], at: NodeRef) -> Option<&TreeNode> {
    let root = roots.get(at.root)?;
    match at.child {
        Some(c) => root.children.get(c),
        None => Some(root),
    }
}

pub fn resolve_mut(roots: &mut [TreeNode], at: NodeRef) -> Option<&mut TreeNode> {
    let root = roots.get_mut(at.root)?;
    match at.child {
        Some(c) => root.children.get_mut(c),
        None => Some(root),
    }
}

/// Carry expand/collapse state over a rebuild.
///
/// A new root takes the previous flag only when the same root (kind, label
/// and backing session) existed before with exactly the same children.
/// Anything regrouped keeps the default from `build_tree`.
pub fn restore_expanded(previous: &[TreeNode], next: &mut [TreeNode]) {
    for node in next.iter_mut().filter(|n| n.has_children()) {
        let same = previous.iter().find(|old| {
            old.kind_matches(node)
                && old.display_name == node.display_name
                && old.children.len() == node.children.len()
                && old.session_names().eq(node.session_names())
        });
        if let Some(old) = same {
            node.expanded = old.expanded;
        }
    }
}

impl TreeNode {
    fn kind_matches(&self, other: &TreeNode) -> bool {
        self.is_group_header() == other.is_group_header()
            && self.session_name() == other.session_name()
    }
}
