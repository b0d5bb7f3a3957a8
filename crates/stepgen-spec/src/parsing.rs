//! Step extraction from feature file text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pattern;
use crate::step::{KeywordToken, StepKeyword, StepRecord};

/// A step line before pattern compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedStep {
    /// Canonical keyword after inheritance
    pub keyword: StepKeyword,
    /// Keyword as written
    pub token: KeywordToken,
    /// Step text, trimmed, trailing colon removed
    pub text: String,
    /// Whether the step introduces a data table
    pub has_table: bool,
    /// 1-based line number
    pub line: usize,
}

impl ExtractedStep {
    /// Compile the step text into a record.
    pub fn compile(self) -> StepRecord {
        let compiled = pattern::compile(&self.text);
        StepRecord {
            keyword: self.keyword,
            raw_text: self.text,
            pattern: compiled.pattern,
            parameters: compiled.parameters,
            has_table: self.has_table,
            line: self.line,
        }
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub steps: Vec<ExtractedStep>,
    /// Lines matching no known construct
    pub skipped_lines: usize,
    pub total_lines: usize,
}

impl Extraction {
    /// Compile every step, in source order.
    pub fn compile(self) -> Vec<StepRecord> {
        self.steps.into_iter().map(ExtractedStep::compile).collect()
    }
}

/// How a single trimmed line is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Comment,
    Header,
    Tag,
    TableRow,
    Fence(&'static str),
    Step(KeywordToken, &'a str),
    Unrecognized,
}

/// Fold accumulator.
#[derive(Debug)]
struct ExtractState {
    previous: StepKeyword,
    open_fence: Option<&'static str>,
    extraction: Extraction,
}

impl Default for ExtractState {
    fn default() -> Self {
        Self {
            // A leading And/But reads as Given
            previous: StepKeyword::Given,
            open_fence: None,
            extraction: Extraction::default(),
        }
    }
}

/// Line-oriented step extractor.
pub struct StepExtractor {
    patterns: ExtractorPatterns,
}

struct ExtractorPatterns {
    step: Regex,
    header: Regex,
}

impl StepExtractor {
    pub fn new() -> Self {
        Self {
            patterns: ExtractorPatterns {
                step: Regex::new(r"^(Given|When|Then|And|But)\s+(.+)$")
                    .expect("valid step pattern"),
                header: Regex::new(
                    r"^(Feature|Rule|Background|Scenario Outline|Scenario Template|Scenario|Examples|Example|Scenarios):",
                )
                .expect("valid header pattern"),
            },
        }
    }

    /// Extract all steps from a feature file's text.
    ///
    /// Never fails: lines that match nothing are skipped and counted.
    pub fn extract(&self, content: &str) -> Extraction {
        let state = content
            .lines()
            .enumerate()
            .fold(ExtractState::default(), |state, (index, line)| {
                self.fold_line(state, index + 1, line)
            });

        let mut extraction = state.extraction;
        extraction.total_lines = content.lines().count();

        if state.open_fence.is_some() {
            debug!("doc string left open at end of file");
        }

        extraction
    }

    fn fold_line(&self, mut state: ExtractState, line_num: usize, line: &str) -> ExtractState {
        let trimmed = line.trim();

        if let Some(fence) = state.open_fence {
            if trimmed.starts_with(fence) {
                state.open_fence = None;
            }
            return state;
        }

        match self.classify(trimmed) {
            LineKind::Fence(fence) => state.open_fence = Some(fence),
            LineKind::Step(token, rest) => {
                let keyword = token.resolve(state.previous);
                state.previous = keyword;
                state.extraction.steps.push(build_step(keyword, token, rest, line_num));
            }
            LineKind::Unrecognized => {
                debug!(line = line_num, text = trimmed, "skipping unrecognized line");
                state.extraction.skipped_lines += 1;
            }
            LineKind::Blank
            | LineKind::Comment
            | LineKind::Header
            | LineKind::Tag
            | LineKind::TableRow => {}
        }

        state
    }

    fn classify<'a>(&self, trimmed: &'a str) -> LineKind<'a> {
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed.starts_with('#') {
            return LineKind::Comment;
        }
        if trimmed.starts_with('@') {
            return LineKind::Tag;
        }
        if trimmed.starts_with('|') {
            return LineKind::TableRow;
        }
        if trimmed.starts_with("\"\"\"") {
            return LineKind::Fence("\"\"\"");
        }
        if trimmed.starts_with("```") {
            return LineKind::Fence("```");
        }
        if self.patterns.header.is_match(trimmed) {
            return LineKind::Header;
        }

        let Some(caps) = self.patterns.step.captures(trimmed) else {
            return LineKind::Unrecognized;
        };
        let (Some(word), Some(rest)) = (caps.get(1), caps.get(2)) else {
            return LineKind::Unrecognized;
        };

        match KeywordToken::parse(word.as_str()) {
            Some(token) => LineKind::Step(token, rest.as_str()),
            None => LineKind::Unrecognized,
        }
    }
}

impl Default for StepExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_step(keyword: StepKeyword, token: KeywordToken, rest: &str, line: usize) -> ExtractedStep {
    let text = rest.trim();
    let (text, has_table) = match text.strip_suffix(':') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (text, false),
    };

    ExtractedStep {
        keyword,
        token,
        text: text.to_string(),
        has_table,
        line,
    }
}
