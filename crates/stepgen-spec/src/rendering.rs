use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::dedup::CompiledStepSet;
use crate::step::{StepKeyword, StepRecord};

/// Built-in template names
pub mod templates {
    pub const FILE: &str = "steps_file";
    pub const DEFINITION: &str = "step_definition";
}

const FILE_TEMPLATE: &str = concat!(
    "import { Given, When, Then, DataTable } from '{{module}}';\n",
    "\n",
    "\n",
    "// Generated from: {{source}}\n",
    "// Total steps: {{total}} ({{unique}} unique)\n",
    "\n",
    "\n",
    "{{#each definitions}}{{this}}\n{{/each}}",
);

const DEFINITION_TEMPLATE: &str = concat!(
    "{{keyword}}(`{{pattern}}`, ({{params}}) => {\n",
    "    // {{comment}}\n",
    "{{#if has_table}}",
    "    // <DataTable> argument is detected:\n",
    "    // - With column headers: use DataTable.rowsHash(), which outputs an object containing key-value pairs for each row (e.g. { key1: value, key2: value }).\n",
    "    // - With row headers: use DataTable.hashes(), which outputs an array of objects (e.g. [{ key1: value, key2: value }]).\n",
    "{{/if~}}\n",
    "});\n",
);

/// Context for a whole generated file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContext {
    /// Module the step functions are imported from
    pub module: String,
    /// Source feature path, relative to the project
    pub source: String,
    /// Steps found before deduplication
    pub total: usize,
    /// Steps left after deduplication
    pub unique: usize,
    /// Rendered definitions in emission order
    pub definitions: Vec<String>,
}

/// Context for one step registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionContext {
    pub keyword: String,
    /// Pattern escaped for a template literal
    pub pattern: String,
    pub params: String,
    pub comment: String,
    pub has_table: bool,
}

impl DefinitionContext {
    pub fn from_record(record: &StepRecord) -> Self {
        Self {
            keyword: record.keyword.as_str().to_string(),
            pattern: template_literal_escape(&record.pattern),
            params: parameter_list(record),
            comment: keyword_comment(record.keyword).to_string(),
            has_table: record.has_table,
        }
    }
}

/// Step definition renderer
pub struct StepRenderer {
    handlebars: Handlebars<'static>,
}

impl StepRenderer {
    /// Create a renderer with the built-in templates
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();

        // Generated code, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars.register_template_string(templates::FILE, FILE_TEMPLATE)?;
        handlebars.register_template_string(templates::DEFINITION, DEFINITION_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Render one step registration
    pub fn render_definition(&self, record: &StepRecord) -> Result<String, RenderError> {
        let context = DefinitionContext::from_record(record);
        Ok(self.handlebars.render(templates::DEFINITION, &context)?)
    }

    /// Render a complete step definition file.
    ///
    /// Definitions are grouped Given, When, Then; each group keeps the
    /// set's insertion order.
    pub fn render_file(
        &self,
        steps: &CompiledStepSet,
        total: usize,
        source: &str,
        module: &str,
    ) -> Result<String, RenderError> {
        let definitions = StepKeyword::ALL
            .iter()
            .flat_map(|keyword| steps.by_keyword(*keyword))
            .map(|record| self.render_definition(record))
            .collect::<Result<Vec<_>, _>>()?;

        let context = FileContext {
            module: module.to_string(),
            source: source.to_string(),
            total,
            unique: steps.len(),
            definitions,
        };

        Ok(self.handlebars.render(templates::FILE, &context)?)
    }
}

/// Fixed comment placed in each generated handler
pub fn keyword_comment(keyword: StepKeyword) -> &'static str {
    match keyword {
        StepKeyword::Given => "[Given] Sets up the initial state of the system.",
        StepKeyword::When => "[When] Describes the action or event that triggers the scenario.",
        StepKeyword::Then => "[Then] Describes the expected outcome or result of the scenario.",
    }
}

/// Handler parameter list, e.g. `arg0: string, arg1: number, dataTable: DataTable`
pub fn parameter_list(record: &StepRecord) -> String {
    let mut params: Vec<String> = record
        .parameters
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("arg{i}: {}", kind.ts_type()))
        .collect();

    if record.has_table {
        params.push("dataTable: DataTable".to_string());
    }

    params.join(", ")
}

/// Escape text for a TypeScript template literal.
pub fn template_literal_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(ch),
        }
    }

    out
}

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}
