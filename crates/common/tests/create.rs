//! Integration tests for node creation

mod common;

use ::common::acl::{self, Permissions};
use ::common::create::PLACEHOLDER_DATA;
use ::common::error::NamespaceError;
use ::common::flags::NodeFlags;
use ::common::session::Operation;

#[tokio::test]
async fn test_create_force_builds_missing_ancestors_top_down() {
    let (client, ns) = common::setup_test_env();

    let created = client.create("/a/b/c", b"v", "", true).await.unwrap();
    assert_eq!(created, "/a/b/c");

    assert_eq!(
        ns.successful_calls(Operation::Create),
        vec!["/a", "/a/b", "/a/b/c"]
    );
    assert_eq!(ns.data("/a").unwrap(), PLACEHOLDER_DATA.to_vec());
    assert_eq!(ns.data("/a/b").unwrap(), PLACEHOLDER_DATA.to_vec());
    assert_eq!(ns.data("/a/b/c").unwrap(), b"v".to_vec());
    common::assert_sessions_released(&ns);
}

#[tokio::test]
async fn test_create_force_stops_walking_at_existing_ancestor() {
    let (client, ns) = common::setup_seeded(&["/a"]);

    client.create("/a/b/c", b"v", "", true).await.unwrap();

    // /a/b/c fails, /a/b succeeds on the way up, then /a/b/c is retried
    assert_eq!(ns.calls(Operation::Create), vec!["/a/b/c", "/a/b", "/a/b/c"]);
    assert!(ns.contains("/a/b/c"));
}

#[tokio::test]
async fn test_create_without_force_creates_nothing() {
    let (client, ns) = common::setup_test_env();

    let err = client.create("/a/b/c", b"v", "", false).await.unwrap_err();
    assert!(matches!(err, NamespaceError::NoNode(ref p) if p == "/a/b/c"));
    assert!(ns.successful_calls(Operation::Create).is_empty());
    assert_eq!(ns.paths(), vec!["/"]);
    common::assert_sessions_released(&ns);
}

#[tokio::test]
async fn test_create_existing_node_fails() {
    let (client, _ns) = common::setup_seeded(&["/x"]);
    let err = client.create("/x", b"", "", false).await.unwrap_err();
    assert!(matches!(err, NamespaceError::NodeExists(_)));
}

#[tokio::test]
async fn test_create_with_acl_text() {
    let (client, ns) = common::setup_test_env();

    client
        .create("/secured", b"", "world:anyone:r,digest:bob:hash:cdrwa", false)
        .await
        .unwrap();

    let acls = ns.acl("/secured").unwrap();
    assert_eq!(acls.len(), 2);
    assert_eq!(acls[0].perms, Permissions::READ);
    assert_eq!(acls[1].scheme, "digest");
    assert_eq!(acls[1].id, "bob:hash");
    assert_eq!(acls[1].perms, Permissions::ALL);
}

#[tokio::test]
async fn test_create_with_bad_acl_text_opens_no_session() {
    let (client, ns) = common::setup_test_env();
    let err = client.create("/x", b"", "world:anyone:rq", false).await.unwrap_err();
    assert!(matches!(err, NamespaceError::AclParse(_)));
    assert_eq!(ns.sessions_opened(), 0);
}

#[tokio::test]
async fn test_create_single_root_makes_no_remote_call() {
    let (client, ns) = common::setup_test_env();

    let created = client
        .create_single("/", b"", NodeFlags::None, &acl::world_acl(Permissions::ALL))
        .await
        .unwrap();
    assert_eq!(created, "/");
    assert_eq!(ns.sessions_opened(), 0);
    assert!(ns.journal().is_empty());
}

#[tokio::test]
async fn test_create_sequential_returns_actual_path() {
    let (mut client, ns) = common::setup_seeded(&["/queue"]);
    client.set_flags(NodeFlags::Sequential.bits());

    let first = client.create("/queue/item-", b"", "", false).await.unwrap();
    let second = client.create("/queue/item-", b"", "", false).await.unwrap();
    assert_eq!(first, "/queue/item-0000000000");
    assert_eq!(second, "/queue/item-0000000001");
    assert!(ns.contains(&second));
}

#[tokio::test]
async fn test_ephemeral_node_vanishes_with_its_session() {
    let (mut client, ns) = common::setup_test_env();
    client.set_flags(NodeFlags::Ephemeral.bits());

    // the creating session is released before create returns
    client.create("/locks/owner", b"", "", true).await.unwrap();
    assert!(ns.contains("/locks"));
    assert!(!ns.contains("/locks/owner"));
}

#[tokio::test]
async fn test_out_of_range_flags_fall_back_to_persistent() {
    let (mut client, ns) = common::setup_test_env();
    client.set_flags(7);
    assert_eq!(client.flags(), NodeFlags::None);

    client.create("/kept", b"", "", false).await.unwrap();
    assert!(ns.contains("/kept"));
}
