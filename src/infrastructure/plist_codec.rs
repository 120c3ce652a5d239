use crate::domain::error::{StoreError, StoreResult};
use crate::domain::model::{
    BookmarkStore, FolderNode, LeafBookmark, Node, NodeId, NodeKind, ProxyNode,
};
use plist::{Dictionary, Value};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;
use tracing::debug;

const CHILDREN: &str = "Children";
const TITLE: &str = "Title";
const FILE_VERSION_KEY: &str = "WebBookmarkFileVersion";
const IDENTIFIER: &str = "WebBookmarkIdentifier";
const NODE_TYPE: &str = "WebBookmarkType";
const UUID: &str = "WebBookmarkUUID";
const URL: &str = "URLString";
const URI_DICTIONARY: &str = "URIDictionary";

pub async fn read_store_bytes(path: &Path) -> StoreResult<Vec<u8>> {
    fs::read(path).await.map_err(|source| StoreError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses XML only. Binary input is rejected so callers can tell the encodings apart.
pub fn parse_xml_store(bytes: &[u8]) -> StoreResult<BookmarkStore> {
    let value = Value::from_reader_xml(Cursor::new(bytes))
        .map_err(|e| StoreError::malformed(format!("not an XML property list: {e}")))?;
    decode_store(value)
}

pub async fn write_xml_store(path: &Path, store: &BookmarkStore) -> StoreResult<()> {
    let mut buf = Vec::new();
    encode_store(store)
        .to_writer_xml(&mut buf)
        .map_err(|e| StoreError::malformed(format!("serializing store: {e}")))?;

    fs::write(path, &buf)
        .await
        .map_err(|source| StoreError::Unwritable {
            path: path.to_path_buf(),
            source,
        })
}

/// Decodes the root. Only the root dictionary and the BookmarksBar list are
/// required to be well formed; any other node that cannot be read as a proxy,
/// list or leaf is kept as `Node::Opaque`.
pub fn decode_store(value: Value) -> StoreResult<BookmarkStore> {
    let mut dict = value
        .into_dictionary()
        .ok_or_else(|| StoreError::malformed("root is not a dictionary"))?;

    let raw_kind = take_string(&mut dict, NODE_TYPE)?
        .ok_or_else(|| StoreError::malformed(format!("root without {NODE_TYPE}")))?;
    if NodeKind::parse(&raw_kind) != Some(NodeKind::List) {
        return Err(StoreError::malformed(format!(
            "root has type {raw_kind}, expected {}",
            NodeKind::List.as_str()
        )));
    }

    let title = take_string(&mut dict, TITLE)?;
    let format_version = match dict.remove(FILE_VERSION_KEY) {
        None => None,
        Some(v) => Some(v.as_signed_integer().ok_or_else(|| {
            StoreError::malformed(format!("{FILE_VERSION_KEY} is not an integer"))
        })?),
    };
    let id = take_string(&mut dict, UUID)?.map(NodeId);
    let children = match dict.remove(CHILDREN) {
        Some(Value::Array(items)) => items.into_iter().map(decode_node).collect(),
        Some(_) => return Err(StoreError::malformed(format!("root {CHILDREN} is not an array"))),
        None => return Err(StoreError::malformed(format!("root has no {CHILDREN}"))),
    };

    BookmarkStore::from_parts(title, format_version, id, children, dict)
}

fn decode_node(value: Value) -> Node {
    let Value::Dictionary(mut dict) = value else {
        return Node::Opaque(value);
    };
    let kind = dict
        .get(NODE_TYPE)
        .and_then(Value::as_string)
        .and_then(NodeKind::parse);
    let kind = match kind {
        Some(kind) if has_shape(&dict, kind) => kind,
        _ => {
            debug!(node_type = ?dict.get(NODE_TYPE), "keeping unrecognized bookmark node as is");
            return Node::Opaque(Value::Dictionary(dict));
        }
    };

    dict.remove(NODE_TYPE);
    let id = pop_string(&mut dict, UUID).map(NodeId);
    match kind {
        NodeKind::Proxy => Node::Proxy(ProxyNode {
            id,
            title: pop_string(&mut dict, TITLE),
            identifier: pop_string(&mut dict, IDENTIFIER),
            extra: dict,
        }),
        NodeKind::List => Node::Folder(FolderNode {
            id,
            title: pop_string(&mut dict, TITLE),
            children: match dict.remove(CHILDREN) {
                Some(Value::Array(items)) => Some(items.into_iter().map(decode_node).collect()),
                _ => None,
            },
            extra: dict,
        }),
        NodeKind::Leaf => Node::Leaf(LeafBookmark {
            id,
            url: pop_string(&mut dict, URL),
            uri: match dict.remove(URI_DICTIONARY) {
                Some(Value::Dictionary(record)) => Some(record),
                _ => None,
            },
            extra: dict,
        }),
    }
}

/// Known keys of `kind`, where present, hold the types this crate reads.
fn has_shape(dict: &Dictionary, kind: NodeKind) -> bool {
    let holds = |key: &str, check: fn(&Value) -> bool| dict.get(key).map_or(true, check);
    let string: fn(&Value) -> bool = |v| v.as_string().is_some();

    holds(UUID, string)
        && match kind {
            NodeKind::Proxy => holds(TITLE, string) && holds(IDENTIFIER, string),
            NodeKind::List => holds(TITLE, string) && holds(CHILDREN, |v| v.as_array().is_some()),
            NodeKind::Leaf => {
                holds(URL, string) && holds(URI_DICTIONARY, |v| v.as_dictionary().is_some())
            }
        }
}

fn take_string(dict: &mut Dictionary, key: &str) -> StoreResult<Option<String>> {
    match dict.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(StoreError::malformed(format!("{key} is not a string"))),
    }
}

/// For keys already checked by `has_shape`.
fn pop_string(dict: &mut Dictionary, key: &str) -> Option<String> {
    dict.remove(key).and_then(Value::into_string)
}

pub fn encode_store(store: &BookmarkStore) -> Value {
    let mut dict = Dictionary::new();
    dict.insert(CHILDREN.to_string(), encode_children(store.children()));
    insert_string(&mut dict, TITLE, store.title.as_deref());
    if let Some(version) = store.format_version {
        dict.insert(FILE_VERSION_KEY.to_string(), Value::Integer(version.into()));
    }
    insert_kind_and_id(&mut dict, NodeKind::List, store.id.as_ref());
    append_extra(&mut dict, &store.extra);
    Value::Dictionary(dict)
}

fn encode_children(children: &[Node]) -> Value {
    Value::Array(children.iter().map(encode_node).collect())
}

fn encode_node(node: &Node) -> Value {
    let mut dict = Dictionary::new();
    match node {
        Node::Proxy(proxy) => {
            insert_string(&mut dict, TITLE, proxy.title.as_deref());
            insert_string(&mut dict, IDENTIFIER, proxy.identifier.as_deref());
            insert_kind_and_id(&mut dict, NodeKind::Proxy, proxy.id.as_ref());
            append_extra(&mut dict, &proxy.extra);
        }
        Node::Folder(folder) => {
            if let Some(children) = &folder.children {
                dict.insert(CHILDREN.to_string(), encode_children(children));
            }
            insert_string(&mut dict, TITLE, folder.title.as_deref());
            insert_kind_and_id(&mut dict, NodeKind::List, folder.id.as_ref());
            append_extra(&mut dict, &folder.extra);
        }
        Node::Leaf(leaf) => {
            if let Some(record) = &leaf.uri {
                dict.insert(URI_DICTIONARY.to_string(), Value::Dictionary(record.clone()));
            }
            insert_string(&mut dict, URL, leaf.url.as_deref());
            insert_kind_and_id(&mut dict, NodeKind::Leaf, leaf.id.as_ref());
            append_extra(&mut dict, &leaf.extra);
        }
        Node::Opaque(value) => return value.clone(),
    }
    Value::Dictionary(dict)
}

fn insert_string(dict: &mut Dictionary, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        dict.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn insert_kind_and_id(dict: &mut Dictionary, kind: NodeKind, id: Option<&NodeId>) {
    dict.insert(NODE_TYPE.to_string(), Value::String(kind.as_str().to_string()));
    if let Some(id) = id {
        dict.insert(UUID.to_string(), Value::String(id.0.clone()));
    }
}

fn append_extra(dict: &mut Dictionary, extra: &Dictionary) {
    for (k, v) in extra.iter() {
        dict.insert(k.clone(), v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BOOKMARKS_BAR, BOOKMARKS_MENU, HISTORY, URI_TITLE};
    use tempfile::tempdir;

    const SAFARI_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Children</key>
	<array>
		<dict>
			<key>Title</key>
			<string>History</string>
			<key>WebBookmarkIdentifier</key>
			<string>History</string>
			<key>WebBookmarkType</key>
			<string>WebBookmarkTypeProxy</string>
			<key>WebBookmarkUUID</key>
			<string>F4B2F4E1-0000-4000-8000-000000000001</string>
		</dict>
		<dict>
			<key>Children</key>
			<array>
				<dict>
					<key>ReadingListNonSync</key>
					<dict>
						<key>neverFetchMetadata</key>
						<false/>
					</dict>
					<key>URIDictionary</key>
					<dict>
						<key>title</key>
						<string>Rust</string>
					</dict>
					<key>URLString</key>
					<string>https://www.rust-lang.org/</string>
					<key>WebBookmarkType</key>
					<string>WebBookmarkTypeLeaf</string>
					<key>WebBookmarkUUID</key>
					<string>F4B2F4E1-0000-4000-8000-000000000002</string>
				</dict>
			</array>
			<key>Title</key>
			<string>BookmarksBar</string>
			<key>WebBookmarkType</key>
			<string>WebBookmarkTypeList</string>
		</dict>
		<dict>
			<key>Title</key>
			<string>BookmarksMenu</string>
			<key>WebBookmarkType</key>
			<string>WebBookmarkTypeList</string>
		</dict>
	</array>
	<key>Sync</key>
	<dict>
		<key>ServerData</key>
		<data>AAEC</data>
	</dict>
	<key>Title</key>
	<string></string>
	<key>WebBookmarkFileVersion</key>
	<integer>1</integer>
	<key>WebBookmarkType</key>
	<string>WebBookmarkTypeList</string>
</dict>
</plist>
"#;

    #[test]
    fn parses_a_safari_store() {
        let store = parse_xml_store(SAFARI_XML.as_bytes()).expect("parse");

        assert_eq!(store.format_version, Some(1));
        assert_eq!(store.id, None);
        assert!(store.extra.contains_key("Sync"));

        let titles: Vec<_> = store.children().iter().map(Node::title).collect();
        assert_eq!(titles, vec![HISTORY, BOOKMARKS_BAR, BOOKMARKS_MENU]);

        let leaf = store.leaves().next().expect("one leaf");
        assert_eq!(leaf.title(), "Rust");
        assert_eq!(leaf.url(), "https://www.rust-lang.org/");
        assert!(leaf.extra.contains_key("ReadingListNonSync"));

        match &store.children()[0] {
            Node::Proxy(p) => assert_eq!(p.identifier.as_deref(), Some(HISTORY)),
            other => panic!("expected proxy, got {other:?}"),
        }
    }

    #[test]
    fn decode_encode_preserves_unknown_keys() {
        let store = parse_xml_store(SAFARI_XML.as_bytes()).expect("parse");
        let again = decode_store(encode_store(&store)).expect("decode");
        assert_eq!(again, store);
        assert_eq!(
            again.extra.get("Sync"),
            store.extra.get("Sync"),
            "opaque sync data must survive"
        );
    }

    #[test]
    fn rejects_binary_and_garbage_input() {
        let mut binary = Vec::new();
        encode_store(&BookmarkStore::default_skeleton())
            .to_writer_binary(&mut binary)
            .expect("binary");

        assert!(parse_xml_store(&binary).is_err());
        assert!(parse_xml_store(b"\x00\x01not a plist").is_err());
        assert!(parse_xml_store(b"").is_err());
    }

    #[test]
    fn unknown_nodes_outside_the_bar_do_not_spoil_the_store() {
        let future_menu_item = r#"<key>Title</key>
			<string>BookmarksMenu</string>
			<key>Children</key>
			<array>
				<dict>
					<key>WebBookmarkType</key>
					<string>WebBookmarkTypeFutureThing</string>
					<key>Payload</key>
					<integer>7</integer>
				</dict>
				<string>not even a dictionary</string>
			</array>"#;
        let xml = SAFARI_XML.replace(
            "<key>Title</key>\n\t\t\t<string>BookmarksMenu</string>",
            future_menu_item,
        );
        assert_ne!(xml, SAFARI_XML);

        let store = parse_xml_store(xml.as_bytes()).expect("parse");
        assert_eq!(store.leaves().map(LeafBookmark::title).collect::<Vec<_>>(), vec!["Rust"]);

        let Node::Folder(menu) = &store.children()[2] else {
            panic!("menu must stay a folder");
        };
        assert!(menu.children().iter().all(|n| matches!(n, Node::Opaque(_))));
        assert_eq!(decode_store(encode_store(&store)).expect("decode"), store);
    }

    #[test]
    fn nodes_with_unexpected_key_types_are_kept_opaque() {
        let xml = SAFARI_XML.replace(
            "<key>WebBookmarkIdentifier</key>\n\t\t\t<string>History</string>",
            "<key>WebBookmarkIdentifier</key>\n\t\t\t<integer>3</integer>",
        );
        assert_ne!(xml, SAFARI_XML);

        let store = parse_xml_store(xml.as_bytes()).expect("parse");
        assert!(matches!(store.children()[0], Node::Opaque(_)));
        assert_eq!(store.leaves().count(), 1);
    }

    #[test]
    fn rejects_missing_bar_and_foreign_roots() {
        let no_bar = SAFARI_XML.replace("<string>BookmarksBar</string>", "<string>Other</string>");
        let err = parse_xml_store(no_bar.as_bytes()).unwrap_err();
        assert!(err.to_string().contains(BOOKMARKS_BAR));
        assert!(err.is_recoverable());

        let mut root = Dictionary::new();
        root.insert("Hello".to_string(), Value::String("world".to_string()));
        assert!(decode_store(Value::Dictionary(root)).is_err());
        assert!(decode_store(Value::Array(vec![])).is_err());
    }

    #[test]
    fn untouched_nodes_encode_exactly_as_read() {
        let mut bare_leaf = Dictionary::new();
        bare_leaf.insert(NODE_TYPE.to_string(), Value::String("WebBookmarkTypeLeaf".to_string()));
        bare_leaf.insert(URL.to_string(), Value::String("http://no-title".to_string()));

        let mut bare_list = Dictionary::new();
        bare_list.insert(NODE_TYPE.to_string(), Value::String("WebBookmarkTypeList".to_string()));

        let mut bar = Dictionary::new();
        bar.insert(TITLE.to_string(), Value::String(BOOKMARKS_BAR.to_string()));
        bar.insert(NODE_TYPE.to_string(), Value::String("WebBookmarkTypeList".to_string()));
        bar.insert(
            CHILDREN.to_string(),
            Value::Array(vec![
                Value::Dictionary(bare_leaf),
                Value::Dictionary(bare_list),
            ]),
        );

        let mut root = Dictionary::new();
        root.insert(NODE_TYPE.to_string(), Value::String("WebBookmarkTypeList".to_string()));
        root.insert(CHILDREN.to_string(), Value::Array(vec![Value::Dictionary(bar)]));
        let original = Value::Dictionary(root);

        let store = decode_store(original.clone()).expect("decode");
        let leaf = store.leaves().next().expect("leaf");
        assert_eq!(leaf.title(), "");
        assert_eq!(leaf.uri, None);

        assert_eq!(encode_store(&store), original);
    }

    #[test]
    fn new_leaves_carry_a_title_record() {
        let mut store = BookmarkStore::default_skeleton();
        store.add("Site", "http://site.example");

        let Value::Dictionary(root) = encode_store(&store) else {
            panic!("root must be a dictionary");
        };
        let bar = &root.get(CHILDREN).and_then(Value::as_array).expect("children")[1];
        let leaf = &bar
            .as_dictionary()
            .and_then(|d| d.get(CHILDREN))
            .and_then(Value::as_array)
            .expect("bar children")[0];
        let leaf = leaf.as_dictionary().expect("leaf dict");

        assert_eq!(
            leaf.get(URI_DICTIONARY)
                .and_then(Value::as_dictionary)
                .and_then(|d| d.get(URI_TITLE))
                .and_then(Value::as_string),
            Some("Site")
        );
        assert_eq!(leaf.get(URL).and_then(Value::as_string), Some("http://site.example"));
        assert_eq!(
            leaf.get(NODE_TYPE).and_then(Value::as_string),
            Some("WebBookmarkTypeLeaf")
        );
        assert_eq!(
            leaf.get(UUID).and_then(Value::as_string),
            Some(NodeId::derive("Site").as_str())
        );
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Bookmarks.plist");

        let mut store = BookmarkStore::default_skeleton();
        store.add("a", "http://a");
        write_xml_store(&path, &store).await.expect("write");

        let bytes = read_store_bytes(&path).await.expect("read");
        assert!(bytes.starts_with(b"<?xml"));
        assert_eq!(parse_xml_store(&bytes).expect("parse"), store);
    }

    #[tokio::test]
    async fn write_into_missing_directory_is_unwritable() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("Bookmarks.plist");

        let err = write_xml_store(&path, &BookmarkStore::default_skeleton())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unwritable { .. }));
    }
}
