use bullseye::pipeline::{
    self,
    PipelineConfig,
    PipelinePaths,
};
use kronik::serde::write_profile_report_file;
use tracing::{
    info,
    instrument,
};

use crate::cli::{
    PersistArgs,
    RunArgs,
    WriteTemplateArgs,
};
use crate::config::{
    load_config,
    validate,
    validate_tracker,
};
use crate::error::CliError;
use crate::processing::ProgressReporter;

/// Main function for the 'run' subcommand.
#[instrument(skip_all)]
pub fn main_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    args.tracking.apply(&mut config.tracker);
    args.matching.apply(&mut config);
    validate(&config)?;
    info!("Using configuration: {:#?}", config);

    let paths = PipelinePaths {
        detections: args.detections,
        spectra: args.spectra,
        matched_output: args.matched_output,
        unmatched_output: args.unmatched_output,
        profile_report: args.profile_report,
    };
    let mut progress = ProgressReporter::new();
    let report = pipeline::run(&paths, &config, &mut progress);
    progress.finish();
    let report = report?;

    if let Some(summary_path) = args.summary_output {
        std::fs::write(&summary_path, serde_json::to_string_pretty(&report)?)?;
        info!("Wrote run summary to {}", summary_path.display());
    }
    Ok(())
}

/// Main function for the 'persist' subcommand.
#[instrument(skip_all)]
pub fn main_persist(args: PersistArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    args.tracking.apply(&mut config.tracker);
    validate_tracker(&config.tracker)?;
    info!("Using tracker configuration: {:#?}", config.tracker);

    let mut progress = ProgressReporter::new();
    let tracked = pipeline::track_profiles(&args.detections, &config.tracker, &mut progress);
    progress.finish();
    let (profiles, summary) = tracked?;
    info!(
        "{} persistent peptides from {} detections",
        summary.num_profiles, summary.initial_detections
    );
    write_profile_report_file(&profiles, &args.output)?;
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_path;
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("bullseye_config_template.json");
    std::fs::write(
        &config_path,
        serde_json::to_string_pretty(&PipelineConfig::default())?,
    )?;
    println!("Wrote configuration template to: {}", config_path.display());
    Ok(())
}
