//! Header navigation model
//!
//! Nav items are stored flat with a `parent_id` and served as the Header
//! global: top-level items, their `dropdown` items, and the dropdown items'
//! `subDropdown` items. Anything nested deeper is not shown.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Media;

/// Navigation item as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavItem {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    /// Icon identifier understood by the frontend
    pub icon: Option<String>,
    pub path: String,
    pub sort_order: i64,
}

/// Input for creating a nav item
#[derive(Debug, Clone)]
pub struct CreateNavItemInput {
    pub parent_id: Option<i64>,
    pub name: String,
    pub icon: Option<String>,
    pub path: String,
    pub sort_order: i64,
}

/// Third-level entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubDropdownItem {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub path: String,
}

/// Second-level entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DropdownItem {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub path: String,
    pub sub_dropdown: Vec<SubDropdownItem>,
}

/// Top-level entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderNavItem {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub path: String,
    pub dropdown: Vec<DropdownItem>,
}

/// The Header global
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeaderGlobal {
    pub main_logo: Option<Media>,
    pub nav_items: Vec<HeaderNavItem>,
}

/// Build the three-level header tree from flat rows.
///
/// Siblings are ordered by `sort_order`, then id. Items whose parent is
/// missing are dropped along with their descendants.
pub fn build_header_nav(items: Vec<NavItem>) -> Vec<HeaderNavItem> {
    let mut children: HashMap<Option<i64>, Vec<NavItem>> = HashMap::new();
    for item in items {
        children.entry(item.parent_id).or_default().push(item);
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|item| (item.sort_order, item.id));
    }

    let take = |children: &mut HashMap<Option<i64>, Vec<NavItem>>, parent: Option<i64>| {
        children.remove(&parent).unwrap_or_default()
    };

    let mut tree = Vec::new();
    for top in take(&mut children, None) {
        let mut dropdown = Vec::new();
        for mid in take(&mut children, Some(top.id)) {
            let sub_dropdown = take(&mut children, Some(mid.id))
                .into_iter()
                .map(|leaf| SubDropdownItem {
                    id: leaf.id,
                    name: leaf.name,
                    icon: leaf.icon,
                    path: leaf.path,
                })
                .collect();
            dropdown.push(DropdownItem {
                id: mid.id,
                name: mid.name,
                icon: mid.icon,
                path: mid.path,
                sub_dropdown,
            });
        }
        tree.push(HeaderNavItem {
            id: top.id,
            name: top.name,
            icon: top.icon,
            path: top.path,
            dropdown,
        });
    }
    tree
}
