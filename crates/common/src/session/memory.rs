use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Connector, Session, Stat};
use crate::acl::{self, Acl, Permissions};
use crate::error::NamespaceError;
use crate::flags::NodeFlags;
use crate::path;

/// In-memory namespace that enforces the same node rules as the server.
///
/// Sessions opened from one namespace share its tree. Every session call
/// lands in a journal so callers can inspect the exact sequence of remote
/// operations an algorithm issued.
#[derive(Debug, Clone)]
pub struct MemoryNamespace {
    inner: Arc<Mutex<MemoryNamespaceInner>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Exists,
    Get,
    Children,
    Create,
    SetData,
    GetAcl,
    SetAcl,
    Delete,
}

/// One session call, in the order it reached the namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub session: i64,
    pub op: Operation,
    pub path: String,
    pub ok: bool,
}

#[derive(Debug, Clone)]
struct MemoryNode {
    data: Vec<u8>,
    acl: Vec<Acl>,
    czxid: i64,
    mzxid: i64,
    pzxid: i64,
    ctime: i64,
    mtime: i64,
    version: i32,
    cversion: i32,
    aversion: i32,
    ephemeral_owner: i64,
    children: BTreeSet<String>,
}

impl MemoryNode {
    fn new(data: Vec<u8>, acl: Vec<Acl>, zxid: i64, ephemeral_owner: i64) -> Self {
        let now = now_millis();
        Self {
            data,
            acl,
            czxid: zxid,
            mzxid: zxid,
            pzxid: zxid,
            ctime: now,
            mtime: now,
            version: 0,
            cversion: 0,
            aversion: 0,
            ephemeral_owner,
            children: BTreeSet::new(),
        }
    }

    fn stat(&self) -> Stat {
        Stat {
            czxid: self.czxid,
            mzxid: self.mzxid,
            ctime: self.ctime,
            mtime: self.mtime,
            version: self.version,
            cversion: self.cversion,
            aversion: self.aversion,
            ephemeral_owner: self.ephemeral_owner,
            data_length: self.data.len() as i32,
            num_children: self.children.len() as i32,
            pzxid: self.pzxid,
        }
    }
}

#[derive(Debug)]
struct MemoryNamespaceInner {
    nodes: BTreeMap<String, MemoryNode>,
    zxid: i64,
    next_session: i64,
    open_sessions: HashSet<i64>,
    sessions_opened: usize,
    journal: Vec<JournalEntry>,
    faults: HashSet<(Operation, String)>,
    offline: bool,
}

impl Default for MemoryNamespaceInner {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            path::ROOT.to_string(),
            MemoryNode::new(Vec::new(), acl::world_acl(Permissions::ALL), 0, 0),
        );
        Self {
            nodes,
            zxid: 0,
            next_session: 1,
            open_sessions: HashSet::new(),
            sessions_opened: 0,
            journal: Vec::new(),
            faults: HashSet::new(),
            offline: false,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

fn check_version(expected: Option<i32>, actual: i32, path: &str) -> Result<(), NamespaceError> {
    match expected {
        Some(version) if version != actual => Err(NamespaceError::BadVersion(path.to_string())),
        _ => Ok(()),
    }
}

impl MemoryNamespaceInner {
    fn next_zxid(&mut self) -> i64 {
        self.zxid += 1;
        self.zxid
    }

    fn node(&self, path: &str) -> Result<&MemoryNode, NamespaceError> {
        self.nodes
            .get(path)
            .ok_or_else(|| NamespaceError::NoNode(path.to_string()))
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut MemoryNode, NamespaceError> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| NamespaceError::NoNode(path.to_string()))
    }

    fn create(
        &mut self,
        session: i64,
        path: &str,
        data: &[u8],
        flags: NodeFlags,
        acl: &[Acl],
    ) -> Result<String, NamespaceError> {
        if path == path::ROOT {
            return Err(NamespaceError::NodeExists(path.to_string()));
        }
        if acl.is_empty() {
            return Err(NamespaceError::InvalidAcl(path.to_string()));
        }

        let parent_path = path::parent(path).to_string();
        let parent = self
            .nodes
            .get(&parent_path)
            .ok_or_else(|| NamespaceError::NoNode(path.to_string()))?;
        if parent.ephemeral_owner != 0 {
            return Err(NamespaceError::NoChildrenForEphemerals(path.to_string()));
        }

        let actual = if flags.is_sequential() {
            format!("{}{:010}", path, parent.cversion)
        } else {
            path.to_string()
        };
        if self.nodes.contains_key(&actual) {
            return Err(NamespaceError::NodeExists(actual));
        }

        let zxid = self.next_zxid();
        let owner = if flags.is_ephemeral() { session } else { 0 };
        self.nodes.insert(
            actual.clone(),
            MemoryNode::new(data.to_vec(), acl.to_vec(), zxid, owner),
        );

        let parent = self.node_mut(&parent_path)?;
        parent.children.insert(path::name(&actual).to_string());
        parent.cversion += 1;
        parent.pzxid = zxid;

        Ok(actual)
    }

    fn delete(&mut self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        if path == path::ROOT {
            return Err(NamespaceError::BadArguments(
                "cannot delete the root node".to_string(),
            ));
        }
        let node = self.node(path)?;
        check_version(version, node.version, path)?;
        if !node.children.is_empty() {
            return Err(NamespaceError::NotEmpty(path.to_string()));
        }
        self.remove(path)
    }

    fn remove(&mut self, path: &str) -> Result<(), NamespaceError> {
        self.nodes.remove(path);
        let zxid = self.next_zxid();
        let parent = self.node_mut(path::parent(path))?;
        parent.children.remove(path::name(path));
        parent.cversion += 1;
        parent.pzxid = zxid;
        Ok(())
    }

    fn set_data(
        &mut self,
        path: &str,
        data: &[u8],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        check_version(version, self.node(path)?.version, path)?;
        let zxid = self.next_zxid();
        let node = self.node_mut(path)?;
        node.data = data.to_vec();
        node.version += 1;
        node.mzxid = zxid;
        node.mtime = now_millis();
        Ok(node.stat())
    }

    fn set_acl(
        &mut self,
        path: &str,
        acl: &[Acl],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        if acl.is_empty() {
            return Err(NamespaceError::InvalidAcl(path.to_string()));
        }
        let node = self.node_mut(path)?;
        check_version(version, node.aversion, path)?;
        node.acl = acl.to_vec();
        node.aversion += 1;
        Ok(node.stat())
    }

    fn expire_ephemerals(&mut self, session: i64) {
        let owned: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.ephemeral_owner == session)
            .map(|(path, _)| path.clone())
            .collect();
        for path in owned {
            if let Err(e) = self.remove(&path) {
                tracing::warn!("failed to expire ephemeral node {}: {}", path, e);
            }
        }
    }
}

impl MemoryNamespace {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryNamespaceInner::default())),
        }
    }

    /// Create `path` and any missing ancestors directly, bypassing the
    ///  journal. Ancestors get empty payloads.
    pub fn seed(&self, path: &str, data: &[u8]) {
        let mut inner = self.inner.lock();
        let mut missing = Vec::new();
        let mut cursor = path;
        while cursor != path::ROOT && !inner.nodes.contains_key(cursor) {
            missing.push(cursor);
            cursor = path::parent(cursor);
        }
        let acl = acl::world_acl(Permissions::ALL);
        for (idx, ancestor) in missing.iter().rev().enumerate() {
            let payload: &[u8] = if idx == missing.len() - 1 { data } else { &[] };
            if let Err(e) = inner.create(0, ancestor, payload, NodeFlags::None, &acl) {
                tracing::warn!("failed to seed {}: {}", ancestor, e);
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().nodes.contains_key(path)
    }

    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().nodes.get(path).map(|node| node.data.clone())
    }

    pub fn acl(&self, path: &str) -> Option<Vec<Acl>> {
        self.inner.lock().nodes.get(path).map(|node| node.acl.clone())
    }

    /// Every node path, root included, in lexicographic order
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().nodes.keys().cloned().collect()
    }

    pub fn journal(&self) -> Vec<JournalEntry> {
        self.inner.lock().journal.clone()
    }

    /// Paths touched by `op`, in call order
    pub fn calls(&self, op: Operation) -> Vec<String> {
        self.inner
            .lock()
            .journal
            .iter()
            .filter(|entry| entry.op == op)
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Paths successfully mutated by `op`, in call order
    pub fn successful_calls(&self, op: Operation) -> Vec<String> {
        self.inner
            .lock()
            .journal
            .iter()
            .filter(|entry| entry.op == op && entry.ok)
            .map(|entry| entry.path.clone())
            .collect()
    }

    pub fn clear_journal(&self) {
        self.inner.lock().journal.clear();
    }

    /// Make every `op` call on `path` fail with a connection error
    pub fn fail_on(&self, op: Operation, path: &str) {
        self.inner.lock().faults.insert((op, path.to_string()));
    }

    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }

    /// Refuse new sessions while offline
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Sessions opened and not yet closed
    pub fn open_sessions(&self) -> usize {
        self.inner.lock().open_sessions.len()
    }

    /// Sessions opened over the namespace's lifetime
    pub fn sessions_opened(&self) -> usize {
        self.inner.lock().sessions_opened
    }
}

impl Default for MemoryNamespace {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryNamespace {
    type Session = MemorySession;

    async fn open(&self) -> Result<Self::Session, NamespaceError> {
        let mut inner = self.inner.lock();
        if inner.offline {
            return Err(NamespaceError::Connection(
                "memory namespace is offline".to_string(),
            ));
        }
        let id = inner.next_session;
        inner.next_session += 1;
        inner.sessions_opened += 1;
        inner.open_sessions.insert(id);

        Ok(MemorySession {
            id,
            namespace: self.clone(),
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct MemorySession {
    id: i64,
    namespace: MemoryNamespace,
    closed: bool,
}

impl MemorySession {
    pub fn id(&self) -> i64 {
        self.id
    }

    fn run<T>(
        &self,
        op: Operation,
        path: &str,
        f: impl FnOnce(&mut MemoryNamespaceInner) -> Result<T, NamespaceError>,
    ) -> Result<T, NamespaceError> {
        if self.closed {
            return Err(NamespaceError::Connection("session is closed".to_string()));
        }

        let mut inner = self.namespace.inner.lock();
        let result = if inner.faults.contains(&(op, path.to_string())) {
            Err(NamespaceError::Connection(format!(
                "injected {:?} failure on {}",
                op, path
            )))
        } else if !path::is_valid(path) {
            Err(NamespaceError::BadArguments(format!("invalid path '{}'", path)))
        } else {
            f(&mut *inner)
        };

        inner.journal.push(JournalEntry {
            session: self.id,
            op,
            path: path.to_string(),
            ok: result.is_ok(),
        });
        result
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn exists(&mut self, path: &str) -> Result<Option<Stat>, NamespaceError> {
        self.run(Operation::Exists, path, |inner| {
            Ok(inner.nodes.get(path).map(MemoryNode::stat))
        })
    }

    async fn get(&mut self, path: &str) -> Result<(Vec<u8>, Stat), NamespaceError> {
        self.run(Operation::Get, path, |inner| {
            let node = inner.node(path)?;
            Ok((node.data.clone(), node.stat()))
        })
    }

    async fn children(&mut self, path: &str) -> Result<Vec<String>, NamespaceError> {
        self.run(Operation::Children, path, |inner| {
            Ok(inner.node(path)?.children.iter().cloned().collect())
        })
    }

    async fn create(
        &mut self,
        path: &str,
        data: &[u8],
        flags: NodeFlags,
        acl: &[Acl],
    ) -> Result<String, NamespaceError> {
        let session = self.id;
        self.run(Operation::Create, path, |inner| {
            inner.create(session, path, data, flags, acl)
        })
    }

    async fn set_data(
        &mut self,
        path: &str,
        data: &[u8],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        self.run(Operation::SetData, path, |inner| {
            inner.set_data(path, data, version)
        })
    }

    async fn get_acl(&mut self, path: &str) -> Result<(Vec<Acl>, Stat), NamespaceError> {
        self.run(Operation::GetAcl, path, |inner| {
            let node = inner.node(path)?;
            Ok((node.acl.clone(), node.stat()))
        })
    }

    async fn set_acl(
        &mut self,
        path: &str,
        acl: &[Acl],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        self.run(Operation::SetAcl, path, |inner| {
            inner.set_acl(path, acl, version)
        })
    }

    async fn delete(&mut self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        self.run(Operation::Delete, path, |inner| inner.delete(path, version))
    }

    async fn close(&mut self) -> Result<(), NamespaceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut inner = self.namespace.inner.lock();
        inner.expire_ephemerals(self.id);
        inner.open_sessions.remove(&self.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Acl> {
        acl::world_acl(Permissions::ALL)
    }

    #[tokio::test]
    async fn test_create_requires_parent() {
        let ns = MemoryNamespace::new();
        let mut session = ns.open().await.unwrap();

        let result = session.create("/a/b", b"x", NodeFlags::None, &all()).await;
        assert!(matches!(result, Err(NamespaceError::NoNode(p)) if p == "/a/b"));

        session.create("/a", b"", NodeFlags::None, &all()).await.unwrap();
        session.create("/a/b", b"x", NodeFlags::None, &all()).await.unwrap();
        assert_eq!(ns.data("/a/b").unwrap(), b"x".to_vec());

        let result = session.create("/a/b", b"y", NodeFlags::None, &all()).await;
        assert!(matches!(result, Err(NamespaceError::NodeExists(_))));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let ns = MemoryNamespace::new();
        ns.seed("/a/b", b"");
        let mut session = ns.open().await.unwrap();

        assert!(matches!(
            session.delete("/a", None).await,
            Err(NamespaceError::NotEmpty(_))
        ));
        assert!(matches!(
            session.delete("/missing", None).await,
            Err(NamespaceError::NoNode(_))
        ));
        assert!(matches!(
            session.delete("/a/b", Some(7)).await,
            Err(NamespaceError::BadVersion(_))
        ));
        session.delete("/a/b", None).await.unwrap();
        session.delete("/a", None).await.unwrap();
        assert_eq!(ns.paths(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn test_sequential_suffix() {
        let ns = MemoryNamespace::new();
        ns.seed("/queue", b"");
        let mut session = ns.open().await.unwrap();

        let first = session
            .create("/queue/item-", b"", NodeFlags::Sequential, &all())
            .await
            .unwrap();
        let second = session
            .create("/queue/item-", b"", NodeFlags::Sequential, &all())
            .await
            .unwrap();
        assert_eq!(first, "/queue/item-0000000000");
        assert_eq!(second, "/queue/item-0000000001");
    }

    #[tokio::test]
    async fn test_ephemeral_removed_on_close() {
        let ns = MemoryNamespace::new();
        let mut session = ns.open().await.unwrap();
        session
            .create("/lock", b"", NodeFlags::Ephemeral, &all())
            .await
            .unwrap();

        let result = session
            .create("/lock/child", b"", NodeFlags::None, &all())
            .await;
        assert!(matches!(
            result,
            Err(NamespaceError::NoChildrenForEphemerals(_))
        ));

        assert!(ns.contains("/lock"));
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(!ns.contains("/lock"));
        assert_eq!(ns.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_set_data_bumps_version() {
        let ns = MemoryNamespace::new();
        ns.seed("/a", b"one");
        let mut session = ns.open().await.unwrap();

        let stat = session.set_data("/a", b"two", None).await.unwrap();
        assert_eq!(stat.version, 1);
        assert_eq!(stat.data_length, 3);
        assert!(matches!(
            session.set_data("/a", b"three", Some(0)).await,
            Err(NamespaceError::BadVersion(_))
        ));
    }

    #[tokio::test]
    async fn test_journal_and_faults() {
        let ns = MemoryNamespace::new();
        ns.seed("/a", b"");
        ns.fail_on(Operation::Get, "/a");
        let mut session = ns.open().await.unwrap();

        assert!(session.get("/a").await.unwrap_err().is_connection());
        assert!(session.exists("/a").await.unwrap().is_some());
        assert_eq!(ns.calls(Operation::Get), vec!["/a".to_string()]);
        assert!(ns.successful_calls(Operation::Get).is_empty());

        ns.clear_faults();
        session.get("/a").await.unwrap();
        assert_eq!(ns.successful_calls(Operation::Get), vec!["/a".to_string()]);

        let journal = ns.journal();
        assert!(journal.iter().all(|entry| entry.session == session.id()));
    }

    #[tokio::test]
    async fn test_rejects_invalid_paths() {
        let ns = MemoryNamespace::new();
        let mut session = ns.open().await.unwrap();
        assert!(matches!(
            session.get("relative").await,
            Err(NamespaceError::BadArguments(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_refuses_sessions() {
        let ns = MemoryNamespace::new();
        ns.set_offline(true);
        assert!(ns.open().await.unwrap_err().is_connection());
        assert_eq!(ns.sessions_opened(), 0);
    }
}
