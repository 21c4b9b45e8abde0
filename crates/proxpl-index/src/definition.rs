//! Go-to-definition.

use crate::error::IndexResult;
use crate::symbol::{Symbol, SymbolKind, SymbolTable, build_symbol_table};
use crate::word::extract_word_at;

/// Resolve the identifier at `offset` to its declarations.
///
/// Functions come before classes; within each kind declarations are in text
/// order. An empty result means there is nothing to jump to.
pub fn find_definition(text: &str, offset: usize) -> IndexResult<Vec<Symbol>> {
    let Some(name) = extract_word_at(text, offset)? else {
        return Ok(Vec::new());
    };
    let table = build_symbol_table(text);
    Ok(definitions_named(&table, name).cloned().collect())
}

/// Declarations of `name` in `table`, functions first.
pub fn definitions_named<'a>(
    table: &'a SymbolTable,
    name: &str,
) -> impl Iterator<Item = &'a Symbol> + use<'a> {
    let functions = table.lookup(name).filter(|s| s.kind == SymbolKind::Function);
    let classes = table.lookup(name).filter(|s| s.kind == SymbolKind::Class);
    functions.chain(classes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_resolves_to_declaration() {
        let text = "func add(a, b) { return a + b; }\nprint(add(1, 2));\n";
        let usage = text.rfind("add").unwrap() + 1;

        let defs = find_definition(text, usage).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "add");
        assert_eq!(defs[0].offset, 0);
        assert_eq!(defs[0].span.slice(text), Some("func add("));
    }

    #[test]
    fn test_functions_before_classes() {
        let text = "class Shape { }\nfunc Shape() { }\nclass Shape { }\nShape();";
        let usage = text.rfind("Shape").unwrap();

        let defs = find_definition(text, usage).unwrap();
        let found: Vec<_> = defs.iter().map(|s| (s.kind, s.offset)).collect();
        assert_eq!(
            found,
            vec![
                (SymbolKind::Function, 16),
                (SymbolKind::Class, 0),
                (SymbolKind::Class, 33),
            ]
        );
    }

    #[test]
    fn test_no_word_or_no_declaration() {
        let text = "var x = y + 1;";
        assert_eq!(find_definition(text, 3), Ok(Vec::new()));
        assert_eq!(find_definition(text, 8), Ok(Vec::new()));
        assert_eq!(find_definition("", 0), Ok(Vec::new()));
    }

    #[test]
    fn test_keyword_is_not_a_definition() {
        let text = "func add() { }";
        assert_eq!(find_definition(text, 1), Ok(Vec::new()));
    }

    #[test]
    fn test_invalid_offset() {
        assert!(find_definition("func f() {}", 100).is_err());
    }
}
