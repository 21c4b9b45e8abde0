//! Open documents and memoised per-revision queries.

use std::sync::Arc;

use dashmap::DashMap;
use proxpl_index::{SymbolTable, build_symbol_table};
use ropey::Rope;
use salsa::Setter;

/// A document snapshot as supplied by the editor.
#[salsa::input(debug)]
pub struct Document {
    #[returns(ref)]
    pub uri: String,
    #[returns(ref)]
    pub text: Rope,
    pub version: i32,
}

/// Declarations of a document.
///
/// Recomputed only when the document's text changes.
#[salsa::tracked(returns(ref))]
pub fn symbol_table(db: &dyn salsa::Database, document: Document) -> SymbolTable {
    let text = document.text(db).to_string();
    let table = build_symbol_table(&text);
    tracing::trace!(uri = %document.uri(db), symbols = table.len(), "Indexed document");
    table
}

#[derive(Default, Clone)]
#[salsa::db]
pub struct ProxDatabase {
    storage: salsa::Storage<Self>,
    documents: Arc<DashMap<String, Document>>,
}

#[salsa::db]
impl salsa::Database for ProxDatabase {}

impl ProxDatabase {
    /// Register a document, replacing any previous document with the same URI.
    pub fn open_document(&self, uri: &str, text: Rope, version: i32) -> Document {
        let document = Document::new(self, uri.to_owned(), text, version);
        self.documents.insert(uri.to_owned(), document);
        document
    }

    pub fn close_document(&self, uri: &str) -> Option<Document> {
        self.documents.remove(uri).map(|(_, document)| document)
    }

    pub fn document(&self, uri: &str) -> Option<Document> {
        self.documents.get(uri).map(|entry| *entry)
    }

    /// Replace a document's text and version.
    pub fn update_document(&mut self, document: Document, text: Rope, version: i32) {
        document.set_text(self).to(text);
        document.set_version(self).to(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_lookup() {
        let db = ProxDatabase::default();
        let uri = "file:///main.prox";
        let doc = db.open_document(uri, Rope::from_str("func main() { }"), 1);

        assert_eq!(db.document(uri), Some(doc));
        assert_eq!(doc.version(&db), 1);
        assert_eq!(symbol_table(&db, doc).len(), 1);
        assert_eq!(db.document("file:///other.prox"), None);
    }

    #[test]
    fn test_update_recomputes_symbols() {
        let mut db = ProxDatabase::default();
        let doc = db.open_document("file:///a.prox", Rope::from_str("func a() { }"), 1);
        assert_eq!(symbol_table(&db, doc).symbols()[0].name, "a");

        db.update_document(doc, Rope::from_str("class B { }\nfunc c() { }"), 2);

        let table = symbol_table(&db, doc);
        let names: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "c"]);
        assert_eq!(doc.version(&db), 2);
    }

    #[test]
    fn test_close_forgets_document() {
        let db = ProxDatabase::default();
        db.open_document("file:///a.prox", Rope::new(), 0);
        assert!(db.document("file:///a.prox").is_some());

        assert!(db.close_document("file:///a.prox").is_some());
        assert!(db.document("file:///a.prox").is_none());
        assert!(db.close_document("file:///a.prox").is_none());
    }

    #[test]
    fn test_documents_are_independent() {
        let db = ProxDatabase::default();
        let a = db.open_document("file:///a.prox", Rope::from_str("func shared() { }"), 1);
        let b = db.open_document("file:///b.prox", Rope::from_str("class shared { }"), 1);

        assert_eq!(
            symbol_table(&db, a).symbols()[0].kind,
            proxpl_index::SymbolKind::Function
        );
        assert_eq!(
            symbol_table(&db, b).symbols()[0].kind,
            proxpl_index::SymbolKind::Class
        );
    }
}
