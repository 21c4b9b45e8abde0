//! Static language vocabulary: reserved keywords, built-in functions and the
//! hand-written descriptions shown on hover.
//!
//! These tables are configuration data maintained alongside the language; they
//! are not derived from any document.

/// Reserved keywords, in the order they are offered for completion.
pub const KEYWORDS: &[&str] = &[
    "func", "class", "if", "else", "while", "for", "return", "print", "var", "let", "const",
    "true", "false", "null", "use", "export", "prox", "loop", "from", "as", "try", "catch",
    "throw", "async", "await",
];

/// Built-in functions and types.
pub const BUILTINS: &[&str] = &["len", "str", "clock", "input", "type"];

/// Hover descriptions, keyed by word.
const DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "func",
        "Defines a new function in ProXPL. Syntax: `func name(params) { ... }`",
    ),
    (
        "var",
        "Declares a new variable. ProXPL is dynamically typed but variables must be declared.",
    ),
    (
        "if",
        "Conditional statement. Executes a block if the condition is true.",
    ),
    ("else", "Defines an alternative block for an `if` statement."),
    (
        "while",
        "Loop that continues as long as a condition is true.",
    ),
    ("return", "Exits a function and optionally returns a value."),
    (
        "print",
        "Built-in function to output values to the terminal.",
    ),
    (
        "import",
        "Incorporates external modules into the current script.",
    ),
];

/// Kind of completion candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Keyword,
    /// A built-in function or type.
    Function,
}

impl CompletionKind {
    /// Short label shown next to a resolved completion item.
    pub const fn detail(self) -> &'static str {
        match self {
            CompletionKind::Keyword => "ProXPL Keyword",
            CompletionKind::Function => "ProXPL Built-in",
        }
    }

    /// Longer documentation shown for a resolved completion item.
    pub const fn documentation(self) -> &'static str {
        match self {
            CompletionKind::Keyword => "A reserved keyword in the ProXPL language.",
            CompletionKind::Function => "A built-in function or type.",
        }
    }
}

/// A completion candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionEntry {
    pub label: &'static str,
    pub kind: CompletionKind,
}

/// Keywords then built-ins, keeping those starting with `prefix` when given.
///
/// The match is a case-sensitive literal prefix match.
pub fn suggest_completions(prefix: Option<&str>) -> Vec<CompletionEntry> {
    let prefix = prefix.unwrap_or("");
    let keywords = KEYWORDS.iter().map(|&label| CompletionEntry {
        label,
        kind: CompletionKind::Keyword,
    });
    let builtins = BUILTINS.iter().map(|&label| CompletionEntry {
        label,
        kind: CompletionKind::Function,
    });
    keywords
        .chain(builtins)
        .filter(|entry| entry.label.starts_with(prefix))
        .collect()
}

/// Classify a word from the static vocabulary.
pub fn vocabulary_kind(word: &str) -> Option<CompletionKind> {
    if KEYWORDS.contains(&word) {
        Some(CompletionKind::Keyword)
    } else if BUILTINS.contains(&word) {
        Some(CompletionKind::Function)
    } else {
        None
    }
}

/// Hover text for a vocabulary word, if one is written.
pub fn describe(word: &str) -> Option<&'static str> {
    DESCRIPTIONS
        .iter()
        .find(|(key, _)| *key == word)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[CompletionEntry]) -> Vec<&'static str> {
        entries.iter().map(|e| e.label).collect()
    }

    #[test]
    fn test_unfiltered_contains_func_and_len() {
        let all = suggest_completions(None);
        assert_eq!(all.len(), KEYWORDS.len() + BUILTINS.len());
        assert!(all.contains(&CompletionEntry {
            label: "func",
            kind: CompletionKind::Keyword
        }));
        assert!(all.contains(&CompletionEntry {
            label: "len",
            kind: CompletionKind::Function
        }));
        assert_eq!(all[0].label, "func");
        assert_eq!(all[KEYWORDS.len()].label, "len");
    }

    #[test]
    fn test_prefix_filter() {
        assert_eq!(
            labels(&suggest_completions(Some("c"))),
            vec!["class", "const", "catch", "clock"]
        );
        assert_eq!(labels(&suggest_completions(Some("ty"))), vec!["type"]);
        assert_eq!(labels(&suggest_completions(Some("")))[..2], ["func", "class"]);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(suggest_completions(Some("Func")).is_empty());
        assert!(suggest_completions(Some("zzz")).is_empty());
    }

    #[test]
    fn test_vocabulary_kind() {
        assert_eq!(vocabulary_kind("await"), Some(CompletionKind::Keyword));
        assert_eq!(vocabulary_kind("clock"), Some(CompletionKind::Function));
        assert_eq!(vocabulary_kind("main"), None);
    }

    #[test]
    fn test_describe() {
        assert!(describe("func").unwrap().contains("func name(params)"));
        assert!(describe("import").is_some());
        assert_eq!(describe("len"), None);
        assert_eq!(describe("Func"), None);
    }
}
