//! Symbol names for generated components.
//!
//! Every input field becomes a piece of component state, so its human label
//! has to be turned into a JavaScript identifier plus the name of the setter
//! returned by `useState`. [`sanitize`] does the per-label conversion;
//! [`IdentifierSet`] is the per-spec accumulator that keeps the names unique.
//! Two labels that sanitize to the same base (`Tasa %` and `Tasa-%` both give
//! `Tasa_`) get deterministic numeric suffixes in field order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-.]+").expect("valid regex"));
static NON_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Used when a label has no symbol characters at all.
pub const PLACEHOLDER: &str = "field";

/// Prefix of every setter name.
pub const SETTER_VERB: &str = "set";

/// ECMAScript reserved words plus the globals a component must not shadow.
const RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield", "NaN", "Infinity", "Object", "Number", "String", "Boolean", "Array",
    "Math", "JSON", "Date", "window", "document", "console", "React",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// State variable name, e.g. `Loan_Amount`.
    pub name: String,
    /// Matching setter, e.g. `setLoan_Amount`.
    pub setter: String,
}

/// Convert one label into an identifier, without any uniqueness tracking.
pub fn sanitize(label: &str) -> Identifier {
    let name = sanitize_base(label);
    let setter = setter_for(&name);
    Identifier { name, setter }
}

fn sanitize_base(label: &str) -> String {
    let joined = SEPARATORS.replace_all(label.trim(), "_");
    let mut base = NON_SYMBOL.replace_all(&joined, "").into_owned();

    if base.is_empty() {
        base = PLACEHOLDER.to_string();
    }
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, '_');
    }
    if is_reserved(&base) {
        base.push('_');
    }
    base
}

/// `set` + the name with leading underscores removed and its first letter
/// upper-cased.
pub fn setter_for(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let mut chars = trimmed.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    };
    format!("{}{}", SETTER_VERB, capitalized)
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Names already handed out within one spec.
///
/// Create one per spec; never share one between specs.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSet {
    taken: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set that already contains `names`, such as the locals a generated
    /// component declares for itself.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Sanitize `label` and disambiguate it against every name issued so far.
    ///
    /// Both the state name and the setter must be free; otherwise `_2`, `_3`,
    /// ... is appended to the base until they are.
    pub fn issue(&mut self, label: &str) -> Identifier {
        let base = sanitize_base(label);
        let mut candidate = Identifier {
            setter: setter_for(&base),
            name: base.clone(),
        };

        let mut counter = 2;
        while self.is_taken(&candidate) {
            let name = format!("{}_{}", base, counter);
            candidate = Identifier {
                setter: setter_for(&name),
                name,
            };
            counter += 1;
        }

        self.taken.insert(candidate.name.clone());
        self.taken.insert(candidate.setter.clone());
        candidate
    }

    fn is_taken(&self, candidate: &Identifier) -> bool {
        self.taken.contains(&candidate.name) || self.taken.contains(&candidate.setter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic_label() {
        let id = sanitize("Loan Amount");
        assert_eq!(id.name, "Loan_Amount");
        assert_eq!(id.setter, "setLoan_Amount");
    }

    #[test]
    fn test_sanitize_separators_and_punctuation() {
        assert_eq!(sanitize("tasa.de-interés  anual").name, "tasa_de_inters_anual");
        assert_eq!(sanitize("Tasa %").name, "Tasa_");
        assert_eq!(sanitize("Tasa-%").name, "Tasa_");
        assert_eq!(sanitize("a \"quoted\" \\ label").name, "a_quoted__label");
    }

    #[test]
    fn test_sanitize_edge_cases() {
        assert_eq!(sanitize("%%%").name, PLACEHOLDER);
        assert_eq!(sanitize("").name, PLACEHOLDER);
        assert_eq!(sanitize("12 meses").name, "_12_meses");
        assert_eq!(sanitize("12 meses").setter, "set12_meses");
        assert_eq!(sanitize("default").name, "default_");
        assert_eq!(sanitize("class").setter, "setClass_");
    }

    #[test]
    fn test_issue_disambiguates_collisions() {
        let mut set = IdentifierSet::new();
        let first = set.issue("Tasa %");
        let second = set.issue("Tasa-%");
        let third = set.issue("Tasa %%");

        assert_eq!(first.name, "Tasa_");
        assert_eq!(second.name, "Tasa__2");
        assert_eq!(third.name, "Tasa__3");
        assert_ne!(first.setter, second.setter);
    }

    #[test]
    fn test_issue_detects_setter_collisions() {
        // `_rate` and `rate` differ as names but both want `setRate`.
        let mut set = IdentifierSet::new();
        let plain = set.issue("Rate");
        let underscored = set.issue("_Rate");

        assert_eq!(plain.setter, "setRate");
        assert_eq!(underscored.name, "_Rate_2");
        assert_eq!(underscored.setter, "setRate_2");
    }

    #[test]
    fn test_issue_avoids_reserved_locals() {
        let mut set = IdentifierSet::with_reserved(["results", "compute"]);
        assert_eq!(set.issue("results").name, "results_2");
        assert_eq!(set.issue("Compute").name, "Compute");
    }

    #[test]
    fn test_sets_are_independent() {
        let mut a = IdentifierSet::new();
        let mut b = IdentifierSet::new();
        assert_eq!(a.issue("Monto").name, "Monto");
        assert_eq!(b.issue("Monto").name, "Monto");
    }

    #[test]
    fn test_all_issued_names_are_unique_and_legal() {
        let labels = [
            "Tasa %", "Tasa-%", "Tasa_", "tasa", "Tasa", "_tasa", "1", "1", "", "%", "for",
            "for_", "Año", "Ao",
        ];
        let mut set = IdentifierSet::new();
        let mut seen = HashSet::new();
        let legal = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

        for label in labels {
            let id = set.issue(label);
            assert!(legal.is_match(&id.name), "illegal name {}", id.name);
            assert!(legal.is_match(&id.setter), "illegal setter {}", id.setter);
            assert!(!is_reserved(&id.name));
            assert!(seen.insert(id.name.clone()), "duplicate {}", id.name);
            assert!(seen.insert(id.setter.clone()), "duplicate {}", id.setter);
        }
    }
}
