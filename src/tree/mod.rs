// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::ast::{Document, SettingDecl, ValueDecl};
use crate::error::{ErrorInfo, Result};
use crate::guard::StoreGuard;
use crate::node::{Arena, Node, NodeId};
use crate::options::{Options, TreeSettings};
use crate::parser::{self, ParseContext};
use crate::value::{Format, ValueKind};
use crate::{writer, ArborError};

mod access;
mod lookup;
mod mutate;

/// A loaded settings tree together with its backing store and formatting
/// settings.
///
/// Store-facing calls (`load_*`, `persist*`) are synchronized through a
/// lock shared by every tree backed by the same file. Node reads and
/// mutations are not: callers sharing one tree across threads must
/// serialize lookup-then-mutate sequences themselves.
pub struct Tree {
    arena: Arena,
    root: Option<NodeId>,
    backing_path: Option<PathBuf>,
    settings: TreeSettings,
    last_error: Mutex<Option<ErrorInfo>>,
    guard: StoreGuard,
    transaction: Option<Transaction>,
}

/// Snapshot taken by the outermost `begin_transaction`.
struct Transaction {
    depth: usize,
    arena: Arena,
    root: Option<NodeId>,
    dirty: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty, unloaded tree with default settings.
    pub fn new() -> Self {
        Self::with_settings(TreeSettings::default())
    }

    pub fn with_settings(mut settings: TreeSettings) -> Self {
        settings.tab_width &= 0x0F;
        Tree {
            arena: Arena::default(),
            root: None,
            backing_path: None,
            settings,
            last_error: Mutex::new(None),
            guard: StoreGuard::detached(),
            transaction: None,
        }
    }

    /// Parse `text` and replace the current root with it.
    ///
    /// The backing path is left as it was. On failure the tree is unchanged.
    pub fn load_from_text(&mut self, text: &str) -> Result<()> {
        let guard = self.guard.clone();
        let _read = guard.read();

        let document = self.track(parser::parse_str(text, self.parse_context()))?;
        self.install(document);
        debug!(settings = self.arena.len(), "loaded configuration from text");
        Ok(())
    }

    /// Read and parse the file at `path`, replace the current root with it
    /// and make `path` the backing store.
    pub fn load_from_store<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let guard = StoreGuard::for_path(path);

        let document = {
            let _read = guard.read();
            self.track(parser::parse_file(path, self.parse_context()))?
        };

        self.install(document);
        self.backing_path = Some(path.to_path_buf());
        self.guard = guard;
        debug!(path = %path.display(), settings = self.arena.len(), "loaded configuration");
        Ok(())
    }

    /// Serialize the tree to its backing path.
    pub fn persist(&self) -> Result<()> {
        let result = match &self.backing_path {
            Some(path) => self.write_store(path, &self.guard),
            None => Err(ArborError::IoFailure {
                path: String::new(),
                message: "no backing path set".into(),
            }),
        };
        self.track(result)
    }

    /// Make `path` the backing store, then persist to it.
    pub fn persist_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.guard = StoreGuard::for_path(path);
        self.backing_path = Some(path.to_path_buf());
        self.persist()
    }

    /// The tree in its textual form, as `persist` would write it.
    pub fn to_text(&self) -> Result<String> {
        let root = self.root()?;
        Ok(writer::write_tree(self, root))
    }

    /// Release every node. Settings and the backing path are kept.
    pub fn clear(&mut self) {
        self.arena = Arena::default();
        self.root = None;
        self.transaction = None;
    }

    pub fn root(&self) -> Result<NodeId> {
        self.track(self.root.ok_or(ArborError::NotLoaded))
    }

    pub fn backing_path(&self) -> Option<&Path> {
        self.backing_path.as_deref()
    }

    /// Details of the most recent failure. Never reset by later successes.
    pub fn last_error(&self) -> Option<ErrorInfo> {
        self.last_error.lock().clone()
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    pub fn options(&self) -> Options {
        self.settings.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.settings.options = options;
    }

    pub fn default_format(&self) -> Format {
        self.settings.default_format
    }

    pub fn set_default_format(&mut self, format: Format) {
        self.settings.default_format = format;
    }

    pub fn tab_width(&self) -> u8 {
        self.settings.tab_width
    }

    /// Values above 15 keep only their low four bits.
    pub fn set_tab_width(&mut self, width: u8) {
        self.settings.tab_width = width & 0x0F;
    }

    pub fn include_dir(&self) -> Option<&Path> {
        self.settings.include_dir.as_deref()
    }

    pub fn set_include_dir<P: Into<PathBuf>>(&mut self, dir: Option<P>) {
        self.settings.include_dir = dir.map(Into::into);
    }

    /// Suspend persist-per-mutation until the matching [`commit`](Self::commit).
    ///
    /// Brackets nest; only the outermost one snapshots and persists.
    pub fn begin_transaction(&mut self) {
        match &mut self.transaction {
            Some(tx) => tx.depth += 1,
            None => {
                self.transaction = Some(Transaction {
                    depth: 1,
                    arena: self.arena.clone(),
                    root: self.root,
                    dirty: false,
                });
            }
        }
    }

    /// Close a transaction bracket. The outermost commit persists once if
    /// anything was mutated inside it.
    pub fn commit(&mut self) -> Result<()> {
        let Some(tx) = &mut self.transaction else {
            return Ok(());
        };
        tx.depth -= 1;
        if tx.depth > 0 {
            return Ok(());
        }

        let dirty = tx.dirty;
        self.transaction = None;
        if dirty { self.persist() } else { Ok(()) }
    }

    /// Abandon the open transaction, restoring the node graph captured by
    /// the outermost `begin_transaction`. The store is not touched.
    pub fn rollback(&mut self) {
        if let Some(tx) = self.transaction.take() {
            self.arena = tx.arena;
            self.root = tx.root;
            debug!("rolled back transaction");
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Write back after a successful mutation, or defer it when a
    /// transaction is open.
    pub(crate) fn persist_after_mutation(&mut self) -> Result<()> {
        if let Some(tx) = &mut self.transaction {
            tx.dirty = true;
            return Ok(());
        }

        self.persist().inspect_err(|e| {
            warn!(error = %e, "setting changed in memory but write-back failed");
        })
    }

    fn write_store(&self, path: &Path, guard: &StoreGuard) -> Result<()> {
        let root = self.root.ok_or(ArborError::NotLoaded)?;
        let text = writer::write_tree(self, root);

        let _write = guard.write();
        // Replace the file a symlink points at, not the link itself.
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| ArborError::io(path, e))?;
        if let Ok(existing) = fs::metadata(&target) {
            file.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| ArborError::io(path, e))?;
        }
        file.write_all(text.as_bytes()).map_err(|e| ArborError::io(path, e))?;
        file.flush().map_err(|e| ArborError::io(path, e))?;
        file.persist(&target).map_err(|e| ArborError::io(path, e.error))?;

        debug!(path = %path.display(), bytes = text.len(), "persisted configuration");
        Ok(())
    }

    fn parse_context(&self) -> ParseContext {
        ParseContext::new(self.settings.options, self.settings.include_dir.clone())
    }

    fn install(&mut self, document: Document) {
        let mut arena = Arena::default();
        let root = arena.insert(Node::container(None, ValueKind::Group));
        for decl in document.settings {
            install_setting(&mut arena, root, decl);
        }
        self.arena = arena;
        self.root = Some(root);
        self.transaction = None;
    }

    /// Record a failure in `last_error` and pass the result through.
    pub(crate) fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            debug!(error = %e, "operation failed");
            *self.last_error.lock() = Some(ErrorInfo::from(e));
        }
        result
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }
}

fn install_setting(arena: &mut Arena, parent: NodeId, decl: SettingDecl) {
    let SettingDecl { name, value, line, file } = decl;
    let (node, children) = match value {
        ValueDecl::Scalar(v, format) => (Node::scalar(name, v).with_format(format), Vec::new()),
        ValueDecl::Array(items) => (Node::container(name, ValueKind::Array), items),
        ValueDecl::List(items) => (Node::container(name, ValueKind::List), items),
        ValueDecl::Group(items) => (Node::container(name, ValueKind::Group), items),
    };

    if let Some(id) = arena.attach(parent, node.with_source(line, file)) {
        for child in children {
            install_setting(arena, id, child);
        }
    }
}
