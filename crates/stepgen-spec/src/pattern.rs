//! Step text to Cucumber expression compiler.
//!
//! Compilation is a fixed pipeline of passes over a [`Compilation`]. While
//! the pipeline runs, placeholders are carried as private-use marker
//! characters instead of `{string}` / `{int}`: markers are neither word
//! characters nor digits, so later passes cannot match inside a placeholder,
//! and the parameter list is read from their final positions. Markers are
//! rendered into Cucumber syntax by [`Compilation::finish`].
//!
//! Every regex-driven pass computes all of its matches against the pass input
//! and rebuilds the text in a single sweep, so no replacement ever shifts the
//! offsets of another.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::step::ParameterKind;

const STRING_MARK: char = '\u{E000}';
const NUMBER_MARK: char = '\u{E001}';

/// Characters with syntactic meaning in a Cucumber expression outside placeholders.
pub const RESERVED: [char; 3] = ['(', ')', '/'];

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).expect("valid quoted pattern"));

static NUMERIC_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^)]*?)([0-9]+)([^)]*?)\)").expect("valid numeric group pattern")
});

static SLASH_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]*/[^)]*)\)").expect("valid slash group pattern"));

static NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]+\b").expect("valid numeral pattern"));

static SLASH_ALTERNATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+|[\x{E000}\x{E001}])/(\w+|[\x{E000}\x{E001}])")
        .expect("valid slash alternative pattern")
});

/// Result of compiling one step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledPattern {
    pub pattern: String,
    pub parameters: Vec<ParameterKind>,
}

/// Intermediate state threaded through the passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compilation {
    text: String,
}

/// A single compiler pass.
pub type Pass = fn(Compilation) -> Compilation;

/// The compiler passes in application order.
pub const PASSES: [Pass; 6] = [
    extract_quoted,
    restructure_numeric_groups,
    flatten_slash_groups,
    substitute_numerals,
    resolve_slashes,
    escape_parentheses,
];

impl Compilation {
    /// Start a compilation from raw step text.
    pub fn new(raw: &str) -> Self {
        // Stray marker characters in the input would forge placeholders
        let text = raw.trim().chars().filter(|c| !is_marker(*c)).collect();
        Self { text }
    }

    /// Parameters in placeholder order.
    pub fn parameters(&self) -> Vec<ParameterKind> {
        self.text
            .chars()
            .filter_map(|c| match c {
                STRING_MARK => Some(ParameterKind::String),
                NUMBER_MARK => Some(ParameterKind::Number),
                _ => None,
            })
            .collect()
    }

    /// Render markers as Cucumber placeholders and escape literal braces.
    ///
    /// A backslash keeps escaping the next character only when that
    /// character may be escaped in a Cucumber expression; otherwise the
    /// backslash itself is escaped, so it can never hide a placeholder.
    pub fn finish(self) -> CompiledPattern {
        let mut pattern = String::with_capacity(self.text.len() + 16);
        let mut parameters = Vec::new();
        let mut chars = self.text.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                STRING_MARK => {
                    pattern.push_str(ParameterKind::String.placeholder());
                    parameters.push(ParameterKind::String);
                }
                NUMBER_MARK => {
                    pattern.push_str(ParameterKind::Number.placeholder());
                    parameters.push(ParameterKind::Number);
                }
                '{' | '}' => {
                    pattern.push('\\');
                    pattern.push(ch);
                }
                '\\' => match chars.next_if(|next| is_escapable(*next)) {
                    Some(next) => {
                        pattern.push('\\');
                        pattern.push(next);
                    }
                    None => pattern.push_str(r"\\"),
                },
                _ => pattern.push(ch),
            }
        }

        CompiledPattern { pattern, parameters }
    }

    fn map(self, f: impl FnOnce(&str) -> String) -> Self {
        Self { text: f(&self.text) }
    }
}

fn is_marker(c: char) -> bool {
    c == STRING_MARK || c == NUMBER_MARK
}

/// Characters a backslash may escape in a Cucumber expression.
fn is_escapable(c: char) -> bool {
    matches!(c, '(' | ')' | '/' | '{' | '}' | '\\') || c.is_whitespace()
}

/// Compile raw step text (trailing table colon already removed).
pub fn compile(raw: &str) -> CompiledPattern {
    PASSES
        .iter()
        .fold(Compilation::new(raw), |compilation, pass| pass(compilation))
        .finish()
}

/// Pass 1: every double-quoted literal becomes a string placeholder.
pub fn extract_quoted(c: Compilation) -> Compilation {
    c.map(|text| QUOTED.replace_all(text, STRING_MARK.to_string()).into_owned())
}

/// Pass 2: a parenthesized group holding a numeral loses its parentheses and
/// the numeral becomes a number placeholder.
///
/// `(> 7 days)` reads as `greater than {int} days`, `(1 hour validity)` as
/// `{int} hour validity`, and `(F5/manual refresh)` as `F{int}/manual refresh`.
pub fn restructure_numeric_groups(c: Compilation) -> Compilation {
    c.map(|text| {
        NUMERIC_GROUP
            .replace_all(text, |caps: &Captures| {
                let prefix = &caps[1];
                let suffix = &caps[3];

                if prefix.trim() == ">" {
                    format!("greater than {NUMBER_MARK}{suffix}")
                } else if prefix.trim().is_empty() && !suffix.trim().is_empty() {
                    format!("{NUMBER_MARK}{suffix}")
                } else {
                    format!("{prefix}{NUMBER_MARK}{suffix}")
                }
            })
            .into_owned()
    })
}

/// Pass 3: a remaining parenthesized group with a slash loses its parentheses
/// and each slash inside reads as `or`.
///
/// Each distinct group text is rewritten once; a repeat of the same group is
/// left to the later slash and parenthesis passes.
pub fn flatten_slash_groups(c: Compilation) -> Compilation {
    c.map(|text| {
        let mut handled: HashSet<String> = HashSet::new();
        SLASH_GROUP
            .replace_all(text, |caps: &Captures| {
                let group = &caps[0];
                if handled.insert(group.to_string()) {
                    caps[1].replace('/', " or ")
                } else {
                    group.to_string()
                }
            })
            .into_owned()
    })
}

/// Pass 4: every standalone decimal numeral becomes a number placeholder.
pub fn substitute_numerals(c: Compilation) -> Compilation {
    c.map(|text| NUMERAL.replace_all(text, NUMBER_MARK.to_string()).into_owned())
}

/// Pass 5: a slash between two words or placeholders reads as `or`; any
/// other slash is escaped.
pub fn resolve_slashes(c: Compilation) -> Compilation {
    c.map(|text| {
        // Matches consume their right-hand token, so `a/b/c` needs a second sweep
        let mut current = text.to_string();
        loop {
            let next = SLASH_ALTERNATIVE
                .replace_all(&current, "${1} or ${2}")
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        escape_chars(&current, &['/'])
    })
}

/// Pass 6: every unescaped parenthesis is escaped.
pub fn escape_parentheses(c: Compilation) -> Compilation {
    c.map(|text| escape_chars(text, &['(', ')']))
}

/// Escape every unescaped reserved character in a compiled pattern.
///
/// Already-escaped characters are left alone, so applying this to its own
/// output changes nothing.
pub fn escape_reserved(pattern: &str) -> String {
    escape_chars(pattern, &RESERVED)
}

fn escape_chars(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if chars.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }

    out
}

/// True when `pattern` has no unescaped `(`, `)` or `/`.
pub fn is_fully_escaped(pattern: &str) -> bool {
    let mut escaped = false;
    for ch in pattern.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if RESERVED.contains(&ch) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::step::ParameterKind::{Number, String as Str};

    fn run(pass: Pass, text: &str) -> String {
        pass(Compilation::new(text)).finish().pattern
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let compiled = compile("the application is running");
        assert_eq!(compiled.pattern, "the application is running");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_quoted_literals() {
        let compiled = compile(r#"a user exists with email "a@b.com" and status "active""#);
        assert_eq!(
            compiled.pattern,
            "a user exists with email {string} and status {string}"
        );
        assert_eq!(compiled.parameters, vec![Str, Str]);
    }

    #[test]
    fn test_empty_quotes_are_a_parameter() {
        let compiled = compile(r#"I enter "" as password"#);
        assert_eq!(compiled.pattern, "I enter {string} as password");
        assert_eq!(compiled.parameters, vec![Str]);
    }

    #[test]
    fn test_quoted_content_is_not_rewritten() {
        let compiled = compile(r#"I type "(5/10)" into the field"#);
        assert_eq!(compiled.pattern, "I type {string} into the field");
        assert_eq!(compiled.parameters, vec![Str]);
    }

    #[test]
    fn test_greater_than_group() {
        let compiled = compile("verification link has expired (> 24 hours)");
        assert_eq!(
            compiled.pattern,
            "verification link has expired greater than {int} hours"
        );
        assert_eq!(compiled.parameters, vec![Number]);
    }

    #[test]
    fn test_leading_numeral_group() {
        assert_eq!(
            run(restructure_numeric_groups, "a reset email (1 hour validity) is sent"),
            "a reset email {int} hour validity is sent"
        );
    }

    #[test]
    fn test_prefixed_numeral_group() {
        let compiled = compile("I refresh the page (F5/manual refresh)");
        assert_eq!(compiled.pattern, "I refresh the page F{int} or manual refresh");
        assert_eq!(compiled.parameters, vec![Number]);
    }

    #[test]
    fn test_bare_numeral_group() {
        assert_eq!(run(restructure_numeric_groups, "retry (3)"), "retry {int}");
    }

    #[test]
    fn test_slash_group_flattened() {
        let compiled = compile("I have been inactive for 30 minutes (no page navigation, no mouse/keyboard activity)");
        assert_eq!(
            compiled.pattern,
            "I have been inactive for {int} minutes no page navigation, no mouse or keyboard activity"
        );
        assert_eq!(compiled.parameters, vec![Number]);
    }

    #[test]
    fn test_repeated_slash_group_rewritten_once() {
        assert_eq!(
            run(flatten_slash_groups, "(a/b) then (a/b)"),
            "a or b then (a/b)"
        );
        assert_eq!(compile("(a/b) then (a/b)").pattern, r"a or b then \(a or b\)");
    }

    #[test]
    fn test_bare_numerals() {
        let compiled = compile("my refresh token has also expired greater than 7 days");
        assert_eq!(
            compiled.pattern,
            "my refresh token has also expired greater than {int} days"
        );
        assert_eq!(compiled.parameters, vec![Number]);

        let compiled = compile("the reset link should be valid for 1 hour only");
        assert_eq!(compiled.pattern, "the reset link should be valid for {int} hour only");
        assert_eq!(compiled.parameters, vec![Number]);
    }

    #[test]
    fn test_digits_inside_words_are_literal() {
        let compiled = compile("I log in with OAuth2 on F5");
        assert_eq!(compiled.pattern, "I log in with OAuth2 on F5");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_parameters_follow_placeholder_position() {
        let compiled = compile(r#"I wait 5 seconds and see "Done""#);
        assert_eq!(compiled.pattern, "I wait {int} seconds and see {string}");
        assert_eq!(compiled.parameters, vec![Number, Str]);

        let compiled = compile(r#"after 3 attempts (> 10 minutes) show "Locked""#);
        assert_eq!(
            compiled.pattern,
            "after {int} attempts greater than {int} minutes show {string}"
        );
        assert_eq!(compiled.parameters, vec![Number, Number, Str]);
    }

    #[test]
    fn test_word_slash_alternatives() {
        assert_eq!(compile("I click the link/button").pattern, "I click the link or button");
        assert_eq!(compile("a/b/c are options").pattern, "a or b or c are options");
    }

    #[test]
    fn test_placeholder_slash_alternatives() {
        let compiled = compile(r#"I wait "short"/5 seconds"#);
        assert_eq!(compiled.pattern, "I wait {string} or {int} seconds");
        assert_eq!(compiled.parameters, vec![Str, Number]);

        assert_eq!(compile("within hours/2 days").pattern, "within hours or {int} days");
    }

    #[test]
    fn test_stray_slash_escaped() {
        assert_eq!(compile("I visit the / page").pattern, r"I visit the \/ page");
        assert_eq!(compile("path ends with/").pattern, r"path ends with\/");
    }

    #[test]
    fn test_parentheses_escaped() {
        let compiled = compile("I have Tikkit mobile app (Flutter) installed");
        assert_eq!(compiled.pattern, r"I have Tikkit mobile app \(Flutter\) installed");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_parenthesis_at_start_and_in_runs() {
        assert_eq!(compile("(optional) first").pattern, r"\(optional\) first");
        assert_eq!(compile("nested ((deep)) text").pattern, r"nested \(\(deep\)\) text");
        assert_eq!(compile(") stray").pattern, r"\) stray");
    }

    #[test]
    fn test_literal_braces_escaped() {
        let compiled = compile("the JSON body is {}");
        assert_eq!(compiled.pattern, r"the JSON body is \{\}");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_marker_characters_in_input_are_dropped() {
        let compiled = compile("odd \u{E000} input");
        assert_eq!(compiled.pattern, "odd  input");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_backslash_before_quoted_literal() {
        let compiled = compile(r#"I type \"hello" now"#);
        assert_eq!(compiled.pattern, r"I type \\{string} now");
        assert_eq!(compiled.parameters, vec![Str]);
    }

    #[test]
    fn test_backslash_before_numeral() {
        let compiled = compile(r"the file is at C:\5 path");
        assert_eq!(compiled.pattern, r"the file is at C:\\{int} path");
        assert_eq!(compiled.parameters, vec![Number]);
    }

    #[test]
    fn test_backslash_handling() {
        assert_eq!(compile(r"C:\temp dir").pattern, r"C:\\temp dir");
        assert_eq!(compile(r"ends with \").pattern, r"ends with \\");
        assert_eq!(compile(r"already \(escaped\)").pattern, r"already \(escaped\)");
        assert_eq!(compile(r"a \\ b").pattern, r"a \\ b");
    }

    #[test]
    fn test_escape_reserved_idempotent_examples() {
        for raw in [
            "I have Tikkit mobile app (Flutter) installed",
            "I visit the / page",
            "(a/b) then (a/b)",
            r"already \(escaped\)",
        ] {
            let pattern = compile(raw).pattern;
            assert_eq!(escape_reserved(&pattern), pattern, "raw: {raw}");
        }
    }

    #[test]
    fn test_error_messages_collapse() {
        let a = compile(r#"I should see the error message "Invalid credentials""#);
        let b = compile(r#"I should see the error message "Account locked""#);
        assert_eq!(a, b);
        assert_eq!(a.pattern, "I should see the error message {string}");
    }

    proptest! {
        #[test]
        fn prop_quoted_literals_become_string_placeholders(
            words in prop::collection::vec("[a-z]{1,8}", 1..6),
            quoted in prop::collection::vec(r"[a-zA-Z0-9 ()/.@\\-]{0,12}", 0..4),
        ) {
            let mut raw = words.join(" ");
            for q in &quoted {
                raw.push_str(&format!(" \"{q}\" x"));
            }

            let compiled = compile(&raw);
            prop_assert_eq!(compiled.pattern.matches("{string}").count(), quoted.len());
            prop_assert!(!compiled.pattern.contains('"'));
            prop_assert_eq!(
                compiled.parameters.iter().filter(|k| **k == Str).count(),
                quoted.len()
            );
        }

        #[test]
        fn prop_standalone_numerals_become_number_placeholders(
            before in "[a-z]{1,8}",
            number in 0u32..100_000,
            after in "[a-z]{1,8}",
        ) {
            let compiled = compile(&format!("{before} {number} {after}"));
            prop_assert_eq!(compiled.pattern, format!("{before} {{int}} {after}"));
            prop_assert_eq!(compiled.parameters, vec![Number]);
        }

        #[test]
        fn prop_output_fully_escaped_and_idempotent(raw in r#"[a-zA-Z0-9 ()/"{}>,.\\-]{0,40}"#) {
            let compiled = compile(&raw);
            prop_assert!(is_fully_escaped(&compiled.pattern));
            prop_assert_eq!(escape_reserved(&compiled.pattern), compiled.pattern.clone());
        }

        #[test]
        fn prop_parameter_count_matches_placeholders(raw in r#"[a-z0-9 ()/"\\]{0,40}"#) {
            let compiled = compile(&raw);
            prop_assert!(!compiled.pattern.chars().any(is_marker));
            let placeholders = compiled.pattern.matches("{string}").count()
                + compiled.pattern.matches("{int}").count();
            prop_assert_eq!(compiled.parameters.len(), placeholders);
        }
    }
}
