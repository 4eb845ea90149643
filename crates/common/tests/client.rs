//! Integration tests for the single-node client operations

mod common;

use ::common::acl::{self, Permissions};
use ::common::client::NamespaceClient;
use ::common::config::ClientConfig;
use ::common::error::NamespaceError;
use ::common::session::Operation;

#[tokio::test]
async fn test_exists() {
    let (client, ns) = common::setup_seeded(&["/present"]);
    assert!(client.exists("/present").await.unwrap());
    assert!(!client.exists("/absent").await.unwrap());
    common::assert_sessions_released(&ns);
}

#[tokio::test]
async fn test_get_and_set_data() {
    let (client, ns) = common::setup_seeded(&["/node"]);
    assert_eq!(client.get("/node").await.unwrap(), b"/node".to_vec());

    let stat = client.set_data("/node", b"updated").await.unwrap();
    assert_eq!(stat.version, 1);
    assert_eq!(stat.data_length, 7);
    assert_eq!(client.get("/node").await.unwrap(), b"updated".to_vec());

    // unconditional: a second write does not need the new version
    client.set_data("/node", b"again").await.unwrap();
    assert_eq!(ns.data("/node").unwrap(), b"again".to_vec());
}

#[tokio::test]
async fn test_get_missing_node() {
    let (client, ns) = common::setup_test_env();
    let err = client.get("/missing").await.unwrap_err();
    assert!(matches!(err, NamespaceError::NoNode(p) if p == "/missing"));
    common::assert_sessions_released(&ns);
}

#[tokio::test]
async fn test_children_and_has_children() {
    let (client, _ns) = common::setup_seeded(&["/p/a", "/p/b", "/leaf"]);

    let mut children = client.children("/p").await.unwrap();
    children.sort();
    assert_eq!(children, vec!["a", "b"]);
    assert!(client.has_children("/p").await.unwrap());
    assert!(!client.has_children("/leaf").await.unwrap());
    assert!(client.has_children("/none").await.unwrap_err().is_no_node());
}

#[tokio::test]
async fn test_every_call_opens_and_closes_its_own_session() {
    let (client, ns) = common::setup_seeded(&["/a"]);

    client.exists("/a").await.unwrap();
    client.get("/a").await.unwrap();
    client.get("/missing").await.unwrap_err();
    client.children("/a").await.unwrap();

    assert_eq!(ns.sessions_opened(), 4);
    common::assert_sessions_released(&ns);

    let sessions: Vec<i64> = ns.journal().iter().map(|entry| entry.session).collect();
    assert_eq!(sessions, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_connection_failure_surfaces_as_connection_error() {
    let (client, ns) = common::setup_seeded(&["/a"]);
    ns.set_offline(true);

    for err in [
        client.exists("/a").await.unwrap_err(),
        client.get("/a").await.unwrap_err(),
        client.delete_recursive("/a").await.unwrap_err(),
        client.create("/b", b"", "", true).await.unwrap_err(),
    ] {
        assert!(err.is_connection(), "unexpected error: {}", err);
    }
    assert!(ns.journal().is_empty());
    assert!(ns.contains("/a"));
}

#[tokio::test]
async fn test_get_acl_strings() {
    let (client, _ns) = common::setup_test_env();
    client
        .create("/n", b"", "world:anyone:rw,ip:10.0.0.1:a", false)
        .await
        .unwrap();

    assert_eq!(
        client.get_acl_strings("/n").await.unwrap(),
        vec!["world:anyone:rw", "ip:10.0.0.1:a"]
    );
    let acls = client.get_acl("/n").await.unwrap();
    assert_eq!(acls[1].perms, Permissions::ADMIN);
}

#[tokio::test]
async fn test_set_acl_replaces_existing() {
    let (client, ns) = common::setup_seeded(&["/n"]);

    let path = client.set_acl("/n", "world:anyone:r", false).await.unwrap();
    assert_eq!(path, "/n");
    assert_eq!(acl::encode(&ns.acl("/n").unwrap()), vec!["world:anyone:r"]);
    assert!(ns.calls(Operation::Create).is_empty());
}

#[tokio::test]
async fn test_set_acl_missing_node_without_force_fails() {
    let (client, ns) = common::setup_test_env();
    let err = client.set_acl("/n", "world:anyone:r", false).await.unwrap_err();
    assert!(err.is_no_node());
    assert!(!ns.contains("/n"));
}

#[tokio::test]
async fn test_set_acl_force_creates_missing_node() {
    let (client, ns) = common::setup_test_env();

    let path = client.set_acl("/x/y", "world:anyone:cdr", true).await.unwrap();
    assert_eq!(path, "/x/y");
    assert_eq!(ns.data("/x/y").unwrap(), Vec::<u8>::new());
    assert_eq!(acl::encode(&ns.acl("/x/y").unwrap()), vec!["world:anyone:cdr"]);
    assert!(ns.calls(Operation::SetAcl).is_empty());
    common::assert_sessions_released(&ns);
}

#[tokio::test]
async fn test_set_acl_rejects_malformed_text_before_connecting() {
    let (client, ns) = common::setup_seeded(&["/n"]);
    let err = client.set_acl("/n", "world:anyone", false).await.unwrap_err();
    assert!(matches!(err, NamespaceError::AclParse(_)));
    assert_eq!(ns.sessions_opened(), 0);
}

#[tokio::test]
async fn test_digest_acl_round_trip() {
    let (client, ns) = common::setup_test_env();
    let digest = acl::digest_acls("user", "password", "31").unwrap();

    client.create_with_acl("/private", b"", false, &digest).await.unwrap();

    assert_eq!(
        client.get_acl_strings("/private").await.unwrap(),
        vec!["digest:user:tpUq/4Pn5A64fVZyQ0gOJ8ZWqkY=:cdrwa"]
    );
    assert_eq!(ns.acl("/private").unwrap(), digest);
}

#[tokio::test]
async fn test_default_acl_comes_from_config() {
    let namespace = ::common::session::MemoryNamespace::new();
    let mut config = ClientConfig::default();
    config.set_acl(acl::world_acl(Permissions::READ | Permissions::CREATE));
    let client = NamespaceClient::new(namespace.clone(), &config);
    assert_eq!(client.default_acl(), config.acl.as_slice());

    client.create("/n", b"", "", false).await.unwrap();
    assert_eq!(acl::encode(&namespace.acl("/n").unwrap()), vec!["world:anyone:cr"]);
}

#[tokio::test]
async fn test_stat_serializes_for_json_output() {
    let (client, _ns) = common::setup_seeded(&["/n"]);
    let stat = client.set_data("/n", b"abc").await.unwrap();

    let value = serde_json::to_value(&stat).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["data_length"], 3);
    assert_eq!(value["num_children"], 0);
}
