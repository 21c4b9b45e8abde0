//! Declaration scanning.
//!
//! ProXPL has no grammar available to the editor tooling, so declarations are
//! recognised lexically: `func <name>(` declares a function and
//! `class <name>{` declares a class. Whitespace is allowed between the keyword
//! and the name (required) and between the name and the delimiter (optional).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::span::Span;
use crate::word::is_ident_byte;

/// Kind of declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
}

impl SymbolKind {
    /// The keyword introducing this kind of declaration.
    pub const fn keyword(self) -> &'static str {
        match self {
            SymbolKind::Function => "func",
            SymbolKind::Class => "class",
        }
    }

    /// The delimiter that must follow the declared name.
    const fn delimiter(self) -> u8 {
        match self {
            SymbolKind::Function => b'(',
            SymbolKind::Class => b'{',
        }
    }
}

/// A declaration found in a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, salsa::Update)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Byte offset of the declaring keyword.
    pub offset: usize,
    /// Keyword through the opening delimiter, e.g. `func add(`.
    pub span: Span,
    /// The declared name alone.
    pub name_span: Span,
}

/// All declarations of one document snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, salsa::Update)]
pub struct SymbolTable {
    /// Declarations in ascending offset order.
    symbols: Vec<Symbol>,
    /// Map from name to indices into `symbols`, each list ascending.
    by_name: BTreeMap<String, Vec<usize>>,
}

impl SymbolTable {
    fn push(&mut self, symbol: Symbol) {
        let index = self.symbols.len();
        self.by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(index);
        self.symbols.push(symbol);
    }

    /// All declarations in text order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Declarations named `name`, in text order.
    pub fn lookup<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Symbol> + use<'a> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&index| &self.symbols[index])
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Scan `text` for function and class declarations.
///
/// Never fails: text that does not look like a declaration is skipped.
pub fn build_symbol_table(text: &str) -> SymbolTable {
    let bytes = text.as_bytes();
    let mut table = SymbolTable::default();
    let mut pos = 0;

    while pos < bytes.len() {
        // Keywords only start at a word boundary.
        if pos > 0 && is_ident_byte(bytes[pos - 1]) {
            pos += 1;
            continue;
        }

        let matched = [SymbolKind::Function, SymbolKind::Class]
            .into_iter()
            .find_map(|kind| match_declaration(text, pos, kind));

        match matched {
            Some(symbol) => {
                pos = symbol.name_span.end;
                table.push(symbol);
            }
            None => pos += 1,
        }
    }

    table
}

/// Try to match a declaration of `kind` starting at byte `start`.
fn match_declaration(text: &str, start: usize, kind: SymbolKind) -> Option<Symbol> {
    let bytes = text.as_bytes();
    let keyword = kind.keyword();
    if !bytes[start..].starts_with(keyword.as_bytes()) {
        return None;
    }

    let after_keyword = start + keyword.len();
    let name_start = skip_whitespace(text, after_keyword);
    if name_start == after_keyword {
        // `funcfoo(` or `func(`
        return None;
    }

    let mut name_end = name_start;
    while name_end < bytes.len() && is_ident_byte(bytes[name_end]) {
        name_end += 1;
    }
    if name_end == name_start {
        return None;
    }

    let delimiter = skip_whitespace(text, name_end);
    if bytes.get(delimiter) != Some(&kind.delimiter()) {
        return None;
    }

    Some(Symbol {
        name: text[name_start..name_end].to_string(),
        kind,
        offset: start,
        span: Span::new(start, delimiter + 1),
        name_span: Span::new(name_start, name_end),
    })
}

/// Advance past any whitespace starting at byte `from`.
fn skip_whitespace(text: &str, from: usize) -> usize {
    let Some(rest) = text.get(from..) else {
        return from;
    };
    rest.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &SymbolTable) -> Vec<(&str, SymbolKind)> {
        table.iter().map(|s| (s.name.as_str(), s.kind)).collect()
    }

    #[test]
    fn test_single_function() {
        let text = "func add(a, b) { return a + b; }";
        let table = build_symbol_table(text);

        assert_eq!(table.len(), 1);
        let add = &table.symbols()[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.offset, 0);
        assert_eq!(add.span.slice(text), Some("func add("));
        assert_eq!(add.name_span.slice(text), Some("add"));
    }

    #[test]
    fn test_duplicate_classes_are_kept() {
        let text = "class Foo { } class Foo { }";
        let table = build_symbol_table(text);

        assert_eq!(
            names(&table),
            vec![("Foo", SymbolKind::Class), ("Foo", SymbolKind::Class)]
        );
        let offsets: Vec<_> = table.lookup("Foo").map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 14]);
    }

    #[test]
    fn test_whitespace_variants() {
        let text = "func\tf  (x) {}\nclass\n  C\n{\n}";
        let table = build_symbol_table(text);

        assert_eq!(
            names(&table),
            vec![("f", SymbolKind::Function), ("C", SymbolKind::Class)]
        );
        assert_eq!(table.symbols()[0].span.slice(text), Some("func\tf  ("));
        assert_eq!(table.symbols()[1].span.slice(text), Some("class\n  C\n{"));
    }

    #[test]
    fn test_rejects_near_misses() {
        for text in [
            "funcadd() {}",
            "func () {}",
            "func add {}",
            "class Foo ()",
            "myfunc add() {}",
            "func add",
            "class",
            "func a-b() {}",
        ] {
            assert!(build_symbol_table(text).is_empty(), "matched in {text:?}");
        }
    }

    #[test]
    fn test_mixed_declarations_in_text_order() {
        let text = "class Point {\n  func init(x, y) { }\n}\nfunc main() { Point(1, 2); }\n";
        let table = build_symbol_table(text);

        assert_eq!(
            names(&table),
            vec![
                ("Point", SymbolKind::Class),
                ("init", SymbolKind::Function),
                ("main", SymbolKind::Function),
            ]
        );
        let offsets: Vec<_> = table.iter().map(|s| s.offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_spans_stay_in_bounds() {
        for text in ["func f(", "class C{", "func g (\u{3000}", "  func  h\u{a0}("] {
            let table = build_symbol_table(text);
            assert_eq!(table.len(), 1, "{text:?}");
            for symbol in &table {
                assert!(symbol.span.end <= text.len());
                assert!(symbol.span.slice(text).is_some());
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "func a() {} class B {} func a() {}";
        assert_eq!(build_symbol_table(text), build_symbol_table(text));
    }

    #[test]
    fn test_malformed_text_never_panics() {
        for text in ["", "(", "func", "func ", "class \u{1F600} {", "\u{0}\u{ffff}func x("] {
            let _ = build_symbol_table(text);
        }
    }
}
