//! Whole-subtree listing and deletion over a single session.

use crate::error::NamespaceError;
use crate::path;
use crate::session::Session;

/// Every descendant of `root` as a path relative to it, depth-first
///  pre-order with siblings sorted by name.
///
/// A node always precedes its descendants. A leaf yields an empty
///  listing. Any failure aborts the walk and the partial listing is
///  dropped.
pub async fn list_recursive<S>(session: &mut S, root: &str) -> Result<Vec<String>, NamespaceError>
where
    S: Session + ?Sized,
{
    let mut listing = Vec::new();
    // (absolute path, path relative to root)
    let mut pending = vec![(root.to_string(), String::new())];

    while let Some((absolute, relative)) = pending.pop() {
        let mut children = session.children(&absolute).await?;
        children.sort();

        if !relative.is_empty() {
            tracing::debug!("incremental child: {}", relative);
            listing.push(relative.clone());
        }

        // reversed so the smallest name is popped first
        for child in children.iter().rev() {
            pending.push((
                path::join(&absolute, child),
                path::join_relative(&relative, child),
            ));
        }
    }

    Ok(listing)
}

/// Delete `root` and everything below it, leaves first.
///
/// Descendants are deleted in reverse pre-order, then `root` itself. The
///  first failed delete stops the run and is returned; nodes deleted
///  before it stay deleted.
pub async fn delete_recursive<S>(session: &mut S, root: &str) -> Result<(), NamespaceError>
where
    S: Session + ?Sized,
{
    let listing = list_recursive(session, root).await?;
    for relative in listing.iter().rev() {
        let node = path::join(root, relative);
        tracing::debug!("deleting: {}", node);
        session.delete(&node, None).await?;
    }
    tracing::debug!("deleting: {}", root);
    session.delete(root, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Connector, MemoryNamespace, Operation};

    #[tokio::test]
    async fn test_listing_is_preorder_with_sorted_siblings() {
        let ns = MemoryNamespace::new();
        for node in ["/r/b/y", "/r/a/z", "/r/a/x/deep", "/r/c"] {
            ns.seed(node, b"");
        }
        let mut session = ns.open().await.unwrap();

        let listing = list_recursive(&mut session, "/r").await.unwrap();
        assert_eq!(
            listing,
            vec!["a", "a/x", "a/x/deep", "a/z", "b", "b/y", "c"]
        );
    }

    #[tokio::test]
    async fn test_listing_from_namespace_root() {
        let ns = MemoryNamespace::new();
        ns.seed("/a/b", b"");
        let mut session = ns.open().await.unwrap();

        let listing = list_recursive(&mut session, "/").await.unwrap();
        assert_eq!(listing, vec!["a", "a/b"]);
        assert_eq!(ns.calls(Operation::Children), vec!["/", "/a", "/a/b"]);
    }

    #[tokio::test]
    async fn test_delete_recursive_reverses_listing() {
        let ns = MemoryNamespace::new();
        for node in ["/r/a/x", "/r/b"] {
            ns.seed(node, b"");
        }
        let mut session = ns.open().await.unwrap();

        delete_recursive(&mut session, "/r").await.unwrap();
        assert_eq!(
            ns.calls(Operation::Delete),
            vec!["/r/b", "/r/a/x", "/r/a", "/r"]
        );
        assert_eq!(ns.paths(), vec!["/"]);
    }
}
