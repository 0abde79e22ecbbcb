use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::git::base_name;
use crate::tmux::Session;

use super::node::TreeNode;

/// Build the session forest.
///
/// Sessions sharing a repo root (worktrees included) are grouped together;
/// the group is labelled with the repo's directory name. A session named
/// exactly like that directory heads the group itself, otherwise a
/// synthetic header does. Sessions without a root fall back to grouping by
/// dash-delimited name prefix. `-main`/`-master` float to the top of their
/// prefix.
pub fn build_tree(sessions: &[Session], repo_roots: &HashMap<String, String>) -> Vec<TreeNode> {
    let mut seen = HashSet::new();
    let mut sorted: Vec<&Session> = sessions
        .iter()
        .filter(|s| seen.insert(s.name.as_str()))
        .collect();
    sorted.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut repo_groups: BTreeMap<&str, Vec<&Session>> = BTreeMap::new();
    let mut no_repo: Vec<&Session> = Vec::new();
    for s in sorted {
        match repo_roots.get(&s.name).filter(|r| !r.is_empty()) {
            Some(root) => repo_groups.entry(root.as_str()).or_default().push(s),
            None => no_repo.push(s),
        }
    }

    let mut roots: Vec<TreeNode> = repo_groups
        .into_iter()
        .map(|(root, group)| repo_group_node(root, &group))
        .collect();
    roots.extend(prefix_group_nodes(&no_repo));
    roots
}

/// Ordering key: `-main`/`-master` sort as their bare prefix, ahead of any
/// sibling sharing that prefix.
pub fn sort_key(name: &str) -> (&str, u8) {
    if let Some(prefix) = name
        .strip_suffix("-main")
        .or_else(|| name.strip_suffix("-master"))
    {
        return (prefix, 0);
    }
    (name, 1)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

fn repo_group_node(root: &str, group: &[&Session]) -> TreeNode {
    if let [only] = group {
        return TreeNode::session(only, only.name.as_str(), 0);
    }

    let group_name = base_name(root).unwrap_or(root);

    let mut parent = match group.iter().find(|s| s.name == group_name) {
        Some(head) => {
            let mut node = TreeNode::session(head, group_name, 0);
            node.expanded = true;
            node
        }
        None => TreeNode::group_header(group_name),
    };

    parent.children = group
        .iter()
        .filter(|s| s.name != group_name)
        .map(|s| TreeNode::session(s, strip_group_prefix(&s.name, group_name), 1))
        .collect();
    parent
}

fn prefix_group_nodes(sessions: &[&Session]) -> Vec<TreeNode> {
    let names: HashSet<&str> = sessions.iter().map(|s| s.name.as_str()).collect();

    let parent_of: HashMap<&str, &str> = sessions
        .iter()
        .filter_map(|s| find_real_parent(&s.name, &names).map(|p| (s.name.as_str(), p)))
        .collect();

    // Chains like app > app-api > app-api-v2 collapse onto the topmost
    // ancestor so the tree stays two levels deep.
    let mut children_of: HashMap<&str, Vec<&Session>> = HashMap::new();
    for s in sessions {
        let Some(mut top) = parent_of.get(s.name.as_str()).copied() else {
            continue;
        };
        while let Some(next) = parent_of.get(top).copied() {
            top = next;
        }
        children_of.entry(top).or_default().push(s);
    }

    sessions
        .iter()
        .filter(|s| !parent_of.contains_key(s.name.as_str()))
        .map(|s| {
            let mut node = TreeNode::session(s, s.name.as_str(), 0);
            if let Some(children) = children_of.get(s.name.as_str()) {
                node.expanded = true;
                node.children = children
                    .iter()
                    .map(|c| TreeNode::session(c, strip_group_prefix(&c.name, &s.name), 1))
                    .collect();
            }
            node
        })
        .collect()
}

/// Longest other name in `names` that is a dash-delimited prefix of `name`.
pub fn find_real_parent<'a>(name: &str, names: &HashSet<&'a str>) -> Option<&'a str> {
    let mut rest = name;
    while let Some(idx) = rest.rfind('-') {
        rest = &rest[..idx];
        // Cutting from the right, the first hit is the longest
        if let Some(found) = names.get(rest) {
            return Some(*found);
        }
    }
    None
}

fn strip_group_prefix<'a>(name: &'a str, group: &str) -> &'a str {
    name.strip_prefix(group)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}
