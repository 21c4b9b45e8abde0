//! Plain-text listings for the command-line front end.

use std::fmt::Write as _;

use proxpl_index::{IndexResult, LineIndex, Symbol, build_symbol_table, find_definition};

/// One line per declaration: `line:column  keyword name`, 1-based.
pub fn render_symbols(text: &str) -> String {
    render_lines(text, build_symbol_table(text).symbols())
}

/// The declarations of the identifier at byte `offset`.
pub fn render_definitions(text: &str, offset: usize) -> IndexResult<String> {
    let definitions = find_definition(text, offset)?;
    if definitions.is_empty() {
        return Ok("no definition".to_string());
    }
    Ok(render_lines(text, &definitions))
}

/// Declarations as pretty-printed JSON.
pub fn symbols_json(text: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(build_symbol_table(text).symbols())
}

fn render_lines(text: &str, symbols: &[Symbol]) -> String {
    let index = LineIndex::new(text);
    let mut out = String::new();
    for symbol in symbols {
        let at = index.line_col(symbol.offset);
        let location = format!("{}:{}", at.line + 1, at.character + 1);
        let _ = writeln!(
            out,
            "{location:<8}{:<6}{}",
            symbol.kind.keyword(),
            symbol.name
        );
    }
    out.truncate(out.trim_end().len());
    out
}
