//! Reconstruction of the navigation forest from flat `sys_menu` rows.
//!
//! The input is expected to be sorted by ascending sort order already; roots
//! and children keep that order. Rows whose parent id does not match any row
//! in the input are dropped together with their descendants.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::entities::menu::{self, ROOT_PARENT_ID};

/// A menu row with its children attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: menu::Model,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn id(&self) -> i32 {
        self.menu.id
    }
}

pub fn build_tree(flat: Vec<menu::Model>) -> Vec<MenuNode> {
    // Arena indices grouped by parent id, in input order.
    let mut children_of: HashMap<i32, Vec<usize>> = HashMap::new();
    for (index, item) in flat.iter().enumerate() {
        children_of.entry(item.parent_id).or_default().push(index);
    }

    let mut arena: Vec<Option<menu::Model>> = flat.into_iter().map(Some).collect();
    let mut visited = HashSet::new();

    let roots = children_of.get(&ROOT_PARENT_ID).cloned().unwrap_or_default();
    roots
        .into_iter()
        .filter_map(|index| attach(index, &mut arena, &children_of, &mut visited))
        .collect()
}

fn attach(
    index: usize,
    arena: &mut [Option<menu::Model>],
    children_of: &HashMap<i32, Vec<usize>>,
    visited: &mut HashSet<i32>,
) -> Option<MenuNode> {
    let menu = arena[index].take()?;
    // A repeated id would otherwise loop forever on malformed data.
    if !visited.insert(menu.id) {
        return None;
    }

    let children = children_of
        .get(&menu.id)
        .map(|indices| {
            indices
                .iter()
                .filter_map(|&child| attach(child, arena, children_of, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(MenuNode { menu, children })
}
