//! `fob-rsc build`.

use std::time::Instant;

use fob_rsc::{BuildOrchestrator, BuildReport, PassStatus, RolldownEngine, TargetReport};

use crate::cli::BuildArgs;
use crate::config;
use crate::error::Result;
use crate::ui;

/// Load configuration, run the build, print a per-target summary.
pub async fn execute(args: BuildArgs, quiet: bool) -> Result<()> {
    let start = Instant::now();
    let config = config::load(&args)?;
    tracing::debug!("resolved configuration: {:?}", config);

    if !quiet {
        ui::info(&format!(
            "Building {} ({})",
            config.cwd.display(),
            if config.split_mode { "split mode" } else { "independent passes" }
        ));
    }

    let report = BuildOrchestrator::new(RolldownEngine::new())
        .build(&config)
        .await?;

    if !quiet {
        print_summary(&report, start.elapsed().as_millis());
    }
    Ok(())
}

fn print_summary(report: &BuildReport, elapsed_ms: u128) {
    for target in [&report.server, &report.browser] {
        let line = target_line(target);
        match target.status {
            PassStatus::Clean => ui::success(&line),
            PassStatus::Warnings(_) => ui::warning(&line),
        }
    }
    ui::info(&format!("client entry: {}", report.client_entry));
    if !report.discovered.is_empty() {
        ui::info(&format!(
            "{} client boundary module(s), {} chunk map record(s)",
            report.discovered.len(),
            report.chunk_map.len()
        ));
    }
    ui::success(&format!("Build finished in {}ms", elapsed_ms));
}

fn target_line(target: &TargetReport) -> String {
    let status = match target.status {
        PassStatus::Clean => String::new(),
        PassStatus::Warnings(n) => format!(" with {} warning(s)", n),
    };
    format!(
        "{} build complete{}: {} file(s) in {}",
        target.target,
        status,
        target.files_written,
        target.out_dir.display()
    )
}
