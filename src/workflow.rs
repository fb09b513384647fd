use crate::agents::{
    EnvironmentPreparer, ExternalFormatter, FormatMode, GoModuleLister, MarkdownFormatter,
    ModuleLister, PublishOutcome, ReportFormatter, ReportPublisher, ReportRenderer,
    ReportRepository, ReportWriter, VersionControlAgent,
};
use crate::config::{CREDENTIAL_VAR, ReportConfig};
use crate::error::Result;
use colored::Colorize;
use jiff::Zoned;
use std::path::PathBuf;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub report_path: PathBuf,
    pub publication: PublishOutcome,
}

/// Execute the report workflow against the configured project
pub fn execute_report(config: &ReportConfig) -> Result<PipelineOutcome> {
    println!("{}", "Generating dependency report...".cyan().bold());

    let lister = GoModuleLister::new(config.go_binary.as_str(), &config.project_path);
    let formatter: Box<dyn ReportFormatter> = match &config.formatter {
        Some(program) => Box::new(ExternalFormatter::new(program.as_str())),
        None => Box::new(MarkdownFormatter),
    };

    let outcome = run_pipeline(
        config,
        &lister,
        formatter.as_ref(),
        || VersionControlAgent::open(&config.project_path),
        Zoned::now(),
    )?;
    print_outcome(&outcome);
    Ok(outcome)
}

/// Runs every step in order; the first failure aborts the run. The
/// repository is only opened once both fragments are formatted.
pub fn run_pipeline<L, F, O, R>(
    config: &ReportConfig,
    lister: &L,
    formatter: &F,
    open_repo: O,
    generated_at: Zoned,
) -> Result<PipelineOutcome>
where
    L: ModuleLister + ?Sized,
    F: ReportFormatter + ?Sized,
    O: FnOnce() -> Result<R>,
    R: ReportRepository,
{
    // Step 1: Prepare environment
    println!(
        "\n{}",
        format!("1. Ensuring output path {}...", config.output_dir.display()).yellow()
    );
    EnvironmentPreparer::ensure_output_dir(&config.output_dir)?;
    let env = EnvironmentPreparer::lister_environment()?;

    // Step 2: List modules
    println!("\n{}", "2. Getting go modules...".yellow());
    let listing = lister.list(&env)?;
    println!(
        "{}",
        format!("✓ Found {} modules", listing.records().len()).green()
    );

    // Step 3: Format both fragments, outdated first
    println!("\n{}", "3. Retrieving outdated dependencies...".yellow());
    let outdated = formatter.format(&listing, FormatMode::OutdatedDirect)?;
    println!("\n{}", "4. Retrieving all dependencies...".yellow());
    let all = formatter.format(&listing, FormatMode::All)?;
    drop(listing);

    // Step 4: Render against HEAD
    let repo = open_repo()?;
    let head = repo.head()?;
    println!(
        "\n{}",
        format!("5. Rendering report for commit {}...", head.short()).yellow()
    );
    let renderer = ReportRenderer::new(&config.project_name, config.commit_link(head.as_str()));
    let content = renderer.render(&generated_at, &head, &outdated, &all);

    // Step 5: Local report, always written
    let report_path = ReportWriter::write(&config.output_dir, &content)?;
    println!(
        "{}",
        format!("✓ Report written to {}", report_path.display()).green()
    );

    // Step 6: Publish when a credential is present
    let publication = match config.credential.as_deref() {
        None => {
            println!(
                "\n{}",
                format!("⚠ {CREDENTIAL_VAR} is not set, skipping publication").yellow()
            );
            PublishOutcome::Skipped
        }
        Some(credential) => {
            println!(
                "\n{}",
                format!("6. Publishing report to {}...", config.branch).yellow()
            );
            ReportPublisher::new(&repo, &config.branch, &config.remote)
                .publish(Some(credential), &content)?
        }
    };

    Ok(PipelineOutcome {
        report_path,
        publication,
    })
}

fn print_outcome(outcome: &PipelineOutcome) {
    println!(
        "\n{} {}",
        "Report:".cyan().bold(),
        outcome.report_path.display()
    );

    if let PublishOutcome::Published { branch, restored } = &outcome.publication {
        println!(
            "{}",
            format!("✓ Report pushed to {branch}, back on {restored}").green()
        );
    }

    println!(
        "\n{}",
        "✨ Dependency report completed successfully!".green().bold()
    );
}
