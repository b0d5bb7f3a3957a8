//! Step keywords, parameter kinds and compiled step records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical step keyword. Secondary keywords never reach this type.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKeyword {
    Given,
    When,
    Then,
}

impl StepKeyword {
    /// Emission order of keyword groups.
    pub const ALL: [StepKeyword; 3] = [StepKeyword::Given, StepKeyword::When, StepKeyword::Then];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword exactly as written at the start of a step line.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum KeywordToken {
    Given,
    When,
    Then,
    And,
    But,
}

impl KeywordToken {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Given" => Some(Self::Given),
            "When" => Some(Self::When),
            "Then" => Some(Self::Then),
            "And" => Some(Self::And),
            "But" => Some(Self::But),
            _ => None,
        }
    }

    /// The canonical keyword for primary tokens, `None` for `And`/`But`.
    pub fn canonical(self) -> Option<StepKeyword> {
        match self {
            Self::Given => Some(StepKeyword::Given),
            Self::When => Some(StepKeyword::When),
            Self::Then => Some(StepKeyword::Then),
            Self::And | Self::But => None,
        }
    }

    /// Resolve against the nearest preceding primary keyword.
    pub fn resolve(self, previous: StepKeyword) -> StepKeyword {
        self.canonical().unwrap_or(previous)
    }
}

/// Type of a placeholder in a compiled pattern.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Number,
}

impl ParameterKind {
    /// Cucumber expression token for this kind.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::String => "{string}",
            Self::Number => "{int}",
        }
    }

    /// TypeScript type of the handler argument.
    pub fn ts_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

/// A step after pattern compilation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepRecord {
    pub keyword: StepKeyword,
    /// Step text as written, trailing colon removed.
    pub raw_text: String,
    pub pattern: String,
    pub parameters: Vec<ParameterKind>,
    pub has_table: bool,
    /// 1-based source line.
    pub line: usize,
}

impl StepRecord {
    /// Uniqueness key within one generated file.
    pub fn key(&self) -> (StepKeyword, &str) {
        (self.keyword, self.pattern.as_str())
    }
}
