// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document provider locator grammar
//!
//! ```text
//! content://<authority>/document/<docId>
//! content://<authority>/tree/<treeId>
//! content://<authority>/tree/<treeId>/document/<docId>
//! content://<authority>/tree/<treeId>/document/<docId>/children
//! ```

use crate::locator::Locator;

pub const PATH_DOCUMENT: &str = "document";
pub const PATH_TREE: &str = "tree";
pub const PATH_CHILDREN: &str = "children";

/// Locator for a document outside of any granted tree.
pub fn build_document_uri(authority: &str, document_id: &str) -> Locator {
    Locator::content(authority, &[PATH_DOCUMENT, document_id])
}

/// Locator for the root of a document tree.
pub fn build_tree_document_uri(authority: &str, document_id: &str) -> Locator {
    Locator::content(authority, &[PATH_TREE, document_id])
}

/// Locator for `document_id` resolved through the tree `tree_uri` belongs to.
pub fn build_document_uri_using_tree(tree_uri: &Locator, document_id: &str) -> Option<Locator> {
    let tree_id = get_tree_document_id(tree_uri)?;
    Some(Locator::content(
        tree_uri.authority(),
        &[PATH_TREE, tree_id.as_str(), PATH_DOCUMENT, document_id],
    ))
}

/// Locator enumerating the children of `parent_document_id` inside the tree.
pub fn build_child_documents_uri_using_tree(
    tree_uri: &Locator,
    parent_document_id: &str,
) -> Option<Locator> {
    let tree_id = get_tree_document_id(tree_uri)?;
    Some(Locator::content(
        tree_uri.authority(),
        &[
            PATH_TREE,
            tree_id.as_str(),
            PATH_DOCUMENT,
            parent_document_id,
            PATH_CHILDREN,
        ],
    ))
}

/// Document id named by a document locator, tree-scoped or not.
pub fn get_document_id(uri: &Locator) -> Option<String> {
    let mut segments = uri.path_segments();
    if segments.len() >= 2 && segments[0] == PATH_DOCUMENT {
        return Some(segments.swap_remove(1));
    }
    if segments.len() >= 4 && segments[0] == PATH_TREE && segments[2] == PATH_DOCUMENT {
        return Some(segments.swap_remove(3));
    }
    None
}

/// Document id of the tree root.
pub fn get_tree_document_id(uri: &Locator) -> Option<String> {
    let mut segments = uri.path_segments();
    if segments.len() >= 2 && segments[0] == PATH_TREE {
        Some(segments.swap_remove(1))
    } else {
        None
    }
}

pub fn is_tree_uri(uri: &Locator) -> bool {
    let segments = uri.path_segments();
    segments.len() >= 2 && segments[0] == PATH_TREE
}

/// Shape check only; whether the authority really is a document provider is
/// for the registry to decide.
pub fn has_document_shape(uri: &Locator) -> bool {
    if !uri.is_content() {
        return false;
    }
    let segments = uri.path_segments();
    match segments.len() {
        2 => segments[0] == PATH_DOCUMENT,
        4 => segments[0] == PATH_TREE && segments[2] == PATH_DOCUMENT,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: &str = "com.example.docs";

    #[test]
    fn test_document_uri() {
        let uri = build_document_uri(AUTH, "primary:a.txt");
        assert_eq!(uri.as_str(), "content://com.example.docs/document/primary%3Aa.txt");
        assert_eq!(get_document_id(&uri).as_deref(), Some("primary:a.txt"));
        assert!(get_tree_document_id(&uri).is_none());
        assert!(has_document_shape(&uri));
    }

    #[test]
    fn test_tree_uri_is_not_a_document() {
        let tree = build_tree_document_uri(AUTH, "primary:");
        assert!(is_tree_uri(&tree));
        assert!(!has_document_shape(&tree));
        assert!(get_document_id(&tree).is_none());
        assert_eq!(get_tree_document_id(&tree).as_deref(), Some("primary:"));
    }

    #[test]
    fn test_document_using_tree() {
        let tree = build_tree_document_uri(AUTH, "root");
        let doc = build_document_uri_using_tree(&tree, "root/Photos").unwrap();
        assert_eq!(
            doc.as_str(),
            "content://com.example.docs/tree/root/document/root%2FPhotos"
        );
        assert_eq!(get_document_id(&doc).as_deref(), Some("root/Photos"));
        assert_eq!(get_tree_document_id(&doc).as_deref(), Some("root"));
        assert!(has_document_shape(&doc));

        // Sibling resolution keeps the tree of the handle it started from.
        let sibling = build_document_uri_using_tree(&doc, "root/Music").unwrap();
        assert_eq!(get_tree_document_id(&sibling).as_deref(), Some("root"));
    }

    #[test]
    fn test_children_uri() {
        let tree = build_tree_document_uri(AUTH, "root");
        let children = build_child_documents_uri_using_tree(&tree, "7").unwrap();
        assert_eq!(
            children.as_str(),
            "content://com.example.docs/tree/root/document/7/children"
        );
        assert!(!has_document_shape(&children));
    }

    #[test]
    fn test_using_tree_requires_tree() {
        let doc = build_document_uri(AUTH, "7");
        assert!(build_document_uri_using_tree(&doc, "8").is_none());
        assert!(build_child_documents_uri_using_tree(&doc, "7").is_none());
    }

    #[test]
    fn test_file_locator_has_no_document_shape() {
        let file = Locator::from_file("/document/7");
        assert!(!has_document_shape(&file));
    }
}
