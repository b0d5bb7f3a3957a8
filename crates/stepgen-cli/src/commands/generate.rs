//! The generation run: discover, compile and write every feature file.

use stepgen_common_config::StepgenConfig;
use stepgen_spec::{Generator, RunSummary};
use tracing::info;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;
use crate::output::{print_output, Progress};

/// Run generation for the project in `ctx`, printing progress as it goes.
pub fn execute(ctx: &CommandContext, config: StepgenConfig) -> Result<(), CliError> {
    let mut progress = Progress::stdout(ctx);
    let summary = generate(ctx, config, &mut progress)?;

    match ctx.format {
        OutputFormat::Text => progress.summary(&summary)?,
        OutputFormat::Json => print_output(ctx, &summary)?,
    }

    info!(
        files = summary.files_processed,
        distinct = summary.distinct_patterns,
        "generation complete"
    );
    Ok(())
}

/// Process every feature file, reporting each one through `progress`.
pub fn generate<W: std::io::Write>(
    ctx: &CommandContext,
    config: StepgenConfig,
    progress: &mut Progress<W>,
) -> Result<RunSummary, CliError> {
    let generator = Generator::new(&ctx.project_dir, config)?;

    progress.searching(
        &generator.features_dir(),
        &generator.config().generation.feature_extension,
    )?;
    let files = generator.discover()?;

    let relative: Vec<String> = files.iter().map(|f| generator.relative(f)).collect();
    progress.found(&relative)?;

    generator.prepare_output()?;

    let mut summary = RunSummary::new();
    for (file, source) in files.iter().zip(&relative) {
        progress.reading(source)?;
        let report = generator.process_file(file)?;
        progress.generated(&report)?;
        summary.record(report);
    }

    Ok(summary)
}
