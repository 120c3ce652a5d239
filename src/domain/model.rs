use crate::domain::error::StoreError;
use plist::{Dictionary, Value};
use uuid::Uuid;

pub const HISTORY: &str = "History";
pub const BOOKMARKS_BAR: &str = "BookmarksBar";
pub const BOOKMARKS_MENU: &str = "BookmarksMenu";
pub const FILE_VERSION: i64 = 1;

/// Name-based node identity (UUIDv5 in the DNS namespace).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub String);

impl NodeId {
    /// Same key, same id. Regenerating structure never produces spurious diffs.
    pub fn derive(key: &str) -> Self {
        NodeId(Uuid::new_v5(&Uuid::NAMESPACE_DNS, key.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The `WebBookmarkType` values this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Proxy,
    List,
    Leaf,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Proxy => "WebBookmarkTypeProxy",
            NodeKind::List => "WebBookmarkTypeList",
            NodeKind::Leaf => "WebBookmarkTypeLeaf",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "WebBookmarkTypeProxy" => Some(NodeKind::Proxy),
            "WebBookmarkTypeList" => Some(NodeKind::List),
            "WebBookmarkTypeLeaf" => Some(NodeKind::Leaf),
            _ => None,
        }
    }
}

/// Non-editable placeholder such as History.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyNode {
    pub id: Option<NodeId>,
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub extra: Dictionary,
}

/// A list node. `None` fields were absent on disk and stay absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub id: Option<NodeId>,
    pub title: Option<String>,
    pub children: Option<Vec<Node>>,
    pub extra: Dictionary,
}

impl FolderNode {
    fn named(title: &str) -> Self {
        Self {
            id: Some(NodeId::derive(title)),
            title: Some(title.to_string()),
            children: Some(Vec::new()),
            extra: Dictionary::new(),
        }
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        self.children.get_or_insert_with(Vec::new)
    }
}

/// Key of the bookmark title inside a leaf's `URIDictionary`.
pub const URI_TITLE: &str = "title";

#[derive(Debug, Clone, PartialEq)]
pub struct LeafBookmark {
    pub id: Option<NodeId>,
    pub url: Option<String>,
    /// The whole `URIDictionary` record; its `title` entry is the bookmark title.
    pub uri: Option<Dictionary>,
    pub extra: Dictionary,
}

impl LeafBookmark {
    pub fn new(title: &str, url: &str) -> Self {
        let mut uri = Dictionary::new();
        uri.insert(URI_TITLE.to_string(), Value::String(title.to_string()));
        Self {
            id: Some(NodeId::derive(title)),
            url: Some(url.to_string()),
            uri: Some(uri),
            extra: Dictionary::new(),
        }
    }

    pub fn title(&self) -> &str {
        self.uri
            .as_ref()
            .and_then(|record| record.get(URI_TITLE))
            .and_then(Value::as_string)
            .unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Proxy(ProxyNode),
    Folder(FolderNode),
    Leaf(LeafBookmark),
    /// Anything that is not a recognizable proxy, list or leaf. Written back as read.
    Opaque(Value),
}

impl Node {
    pub fn title(&self) -> &str {
        match self {
            Node::Proxy(p) => p.title.as_deref().unwrap_or_default(),
            Node::Folder(f) => f.title.as_deref().unwrap_or_default(),
            Node::Leaf(l) => l.title(),
            Node::Opaque(_) => "",
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafBookmark> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    fn is_leaf_titled(&self, title: &str) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.title() == title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    DuplicateSkipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Root of the bookmark hierarchy.
///
/// Always holds a `BookmarksBar` list folder among its children; that folder is
/// the domain in which leaf titles are looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkStore {
    pub title: Option<String>,
    pub format_version: Option<i64>,
    pub id: Option<NodeId>,
    pub extra: Dictionary,
    children: Vec<Node>,
    bar: usize,
}

impl BookmarkStore {
    pub fn from_parts(
        title: Option<String>,
        format_version: Option<i64>,
        id: Option<NodeId>,
        children: Vec<Node>,
        extra: Dictionary,
    ) -> Result<Self, StoreError> {
        let bar = children
            .iter()
            .position(|n| matches!(n, Node::Folder(f) if f.title.as_deref() == Some(BOOKMARKS_BAR)))
            .ok_or_else(|| StoreError::malformed(format!("missing {BOOKMARKS_BAR} folder")))?;

        Ok(Self {
            title,
            format_version,
            id,
            extra,
            children,
            bar,
        })
    }

    /// The empty store Safari expects on first run.
    pub fn default_skeleton() -> Self {
        let children = vec![
            Node::Proxy(ProxyNode {
                id: Some(NodeId::derive(HISTORY)),
                title: Some(HISTORY.to_string()),
                identifier: Some(HISTORY.to_string()),
                extra: Dictionary::new(),
            }),
            Node::Folder(FolderNode::named(BOOKMARKS_BAR)),
            Node::Folder(FolderNode::named(BOOKMARKS_MENU)),
        ];

        Self {
            title: Some(String::new()),
            format_version: Some(FILE_VERSION),
            id: Some(NodeId::derive("")),
            extra: Dictionary::new(),
            children,
            bar: 1,
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn bookmarks_bar(&self) -> &FolderNode {
        match &self.children[self.bar] {
            Node::Folder(folder) => folder,
            _ => unreachable!("bar index always points at a folder"),
        }
    }

    fn bookmarks_bar_mut(&mut self) -> &mut FolderNode {
        match &mut self.children[self.bar] {
            Node::Folder(folder) => folder,
            _ => unreachable!("bar index always points at a folder"),
        }
    }

    /// Leaf bookmarks directly under the bookmarks bar, in order.
    pub fn leaves(&self) -> impl Iterator<Item = &LeafBookmark> {
        self.bookmarks_bar().children().iter().filter_map(Node::as_leaf)
    }

    /// Exact, case-sensitive title match among the bookmarks bar leaves.
    pub fn exists(&self, title: &str) -> bool {
        self.bookmarks_bar()
            .children()
            .iter()
            .any(|n| n.is_leaf_titled(title))
    }

    pub fn add(&mut self, title: &str, url: &str) -> AddOutcome {
        if self.exists(title) {
            return AddOutcome::DuplicateSkipped;
        }
        self.bookmarks_bar_mut()
            .children_mut()
            .push(Node::Leaf(LeafBookmark::new(title, url)));
        AddOutcome::Added
    }

    /// Removes the first bar leaf with this exact title. Later duplicates stay.
    pub fn remove(&mut self, title: &str) -> RemoveOutcome {
        let Some(children) = self.bookmarks_bar_mut().children.as_mut() else {
            return RemoveOutcome::NotFound;
        };
        match children.iter().position(|n| n.is_leaf_titled(title)) {
            Some(idx) => {
                children.remove(idx);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotFound,
        }
    }

    /// Empties the bookmarks bar and hands back what was in it.
    pub fn remove_all(&mut self) -> Vec<Node> {
        self.bookmarks_bar_mut()
            .children
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }
}
