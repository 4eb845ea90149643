//! Node creation that fills in missing ancestors on demand.

use crate::acl::Acl;
use crate::error::NamespaceError;
use crate::flags::NodeFlags;
use crate::path;
use crate::session::Session;

/// Payload written to ancestors created on the caller's behalf
pub const PLACEHOLDER_DATA: &[u8] = b"auto-generated";

/// Create `path`, and with `force` any missing ancestors.
///
/// The first failed create of `path` walks upwards, trying each ancestor
/// once until one succeeds or the root is reached, then retries every
/// failed path exactly once more, top-down. The result of that final retry
/// of `path` is what the caller sees. Without `force` the first error is
/// returned as is.
///
/// Ancestors are always created persistent with [`PLACEHOLDER_DATA`] and
/// the same ACL; only `path` itself gets `flags`.
pub async fn create_with_auto_parent<S>(
    session: &mut S,
    path: &str,
    data: &[u8],
    flags: NodeFlags,
    acl: &[Acl],
    force: bool,
) -> Result<String, NamespaceError>
where
    S: Session + ?Sized,
{
    if path == path::ROOT {
        return Ok(path::ROOT.to_string());
    }

    tracing::debug!("creating: {}", path);
    match session.create(path, data, flags, acl).await {
        Ok(created) => return Ok(created),
        Err(e) => {
            tracing::debug!("create status for {}: {}", path, e);
            if !force {
                return Err(e);
            }
        }
    }

    // ancestors whose first attempt failed, deepest first
    let mut missing = Vec::new();
    // ancestors ignore `flags`: an ephemeral or sequential parent breaks the chain
    let mut cursor = path::parent(path);
    while cursor != path::ROOT {
        tracing::debug!("creating: {}", cursor);
        match session
            .create(cursor, PLACEHOLDER_DATA, NodeFlags::None, acl)
            .await
        {
            Ok(_) => break,
            Err(e) => {
                tracing::debug!("create status for {}: {}", cursor, e);
                missing.push(cursor);
                cursor = path::parent(cursor);
            }
        }
    }

    for ancestor in missing.iter().rev() {
        if let Err(e) = session
            .create(ancestor, PLACEHOLDER_DATA, NodeFlags::None, acl)
            .await
        {
            tracing::debug!("create status for {}: {}", ancestor, e);
        }
    }

    let result = session.create(path, data, flags, acl).await;
    if let Err(e) = &result {
        tracing::debug!("create status for {}: {}", path, e);
    }
    result
}

/// Replace the ACL of `path`. With `force`, a missing node is created
/// (empty payload, missing ancestors included) carrying `acl` instead.
pub async fn set_acl_or_create<S>(
    session: &mut S,
    path: &str,
    acl: &[Acl],
    flags: NodeFlags,
    force: bool,
) -> Result<String, NamespaceError>
where
    S: Session + ?Sized,
{
    if force && session.exists(path).await?.is_none() {
        return create_with_auto_parent(session, path, b"", flags, acl, force).await;
    }
    session.set_acl(path, acl, None).await?;
    Ok(path.to_string())
}
