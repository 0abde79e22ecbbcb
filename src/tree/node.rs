use serde::Serialize;

use crate::tmux::Session;

/// What a tree row stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Backed by a real tmux session
    Session {
        session_name: String,
        windows: u32,
        attached: bool,
    },
    /// Synthetic label for sessions sharing a repo, no backing session
    GroupHeader,
}

/// One entry of the session forest. Roots sit at depth 0, their children
/// at depth 1; nothing goes deeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub display_name: String,
    pub depth: usize,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn session(session: &Session, display_name: impl Into<String>, depth: usize) -> Self {
        Self {
            kind: NodeKind::Session {
                session_name: session.name.clone(),
                windows: session.windows,
                attached: session.attached,
            },
            display_name: display_name.into(),
            depth,
            expanded: false,
            children: Vec::new(),
        }
    }

    pub(crate) fn group_header(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::GroupHeader,
            display_name: name.into(),
            depth: 0,
            expanded: true,
            children: Vec::new(),
        }
    }

    /// Backing session name, `None` for group headers
    pub fn session_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Session { session_name, .. } => Some(session_name),
            NodeKind::GroupHeader => None,
        }
    }

    pub fn windows(&self) -> u32 {
        match self.kind {
            NodeKind::Session { windows, .. } => windows,
            NodeKind::GroupHeader => 0,
        }
    }

    pub fn attached(&self) -> bool {
        match self.kind {
            NodeKind::Session { attached, .. } => attached,
            NodeKind::GroupHeader => false,
        }
    }

    pub fn is_group_header(&self) -> bool {
        matches!(self.kind, NodeKind::GroupHeader)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Session names of this node and its children, in display order
    pub fn session_names(&self) -> impl Iterator<Item = &str> {
        self.session_name()
            .into_iter()
            .chain(self.children.iter().filter_map(TreeNode::session_name))
    }
}
