//! Command implementations
//!
//! Each handler drives one orchestrator through the stages it needs and
//! renders the result. Content goes to stdout; status lines go to stderr so
//! `--json` output stays machine-readable.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::doctor::{CheckStatus, DoctorCommand, DoctorOutput};
use crate::{
    Adapters, Config, ExitCode, HeadsongError, Orchestrator, PipelineError, PipelineSnapshot,
    SongOutcome, emit_jcs,
};

fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    Ok(Orchestrator::from_config(config).map_err(HeadsongError::from)?)
}

/// Turn a stage failure into the command error, printing the snapshot first
/// in JSON mode so callers still see what was kept.
fn stage_failed(orchestrator: &Orchestrator, json: bool, err: PipelineError) -> anyhow::Error {
    if json && let Err(e) = print_snapshot_json(&orchestrator.snapshot()) {
        return e;
    }
    HeadsongError::from(err).into()
}

fn print_snapshot_json(snapshot: &PipelineSnapshot) -> Result<()> {
    let json_output = emit_jcs(snapshot).context("Failed to emit pipeline JSON")?;
    println!("{json_output}");
    Ok(())
}

fn print_status(orchestrator: &Orchestrator) {
    eprintln!("✓ {}", orchestrator.status_line());
}

fn print_headlines(snapshot: &PipelineSnapshot) {
    for headline in &snapshot.headlines {
        let marker = if headline.selected { '*' } else { ' ' };
        println!("{marker} [{:>2}] {}", headline.index, headline.title);
    }
}

fn pretty(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

async fn fetch(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    match orchestrator.fetch_headlines().await {
        Ok(_) => {
            print_status(orchestrator);
            Ok(())
        }
        Err(e) => Err(stage_failed(orchestrator, json, e)),
    }
}

/// Select the given indices on a freshly fetched headline set
fn select(orchestrator: &Orchestrator, indices: &[usize], json: bool) -> Result<()> {
    let unique: BTreeSet<usize> = indices.iter().copied().collect();
    for index in unique {
        if let Err(e) = orchestrator.toggle_selection(index) {
            return Err(stage_failed(orchestrator, json, e));
        }
    }
    Ok(())
}

async fn lyrics(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    match orchestrator.generate_lyrics().await {
        Ok(_) => {
            print_status(orchestrator);
            Ok(())
        }
        Err(e) => Err(stage_failed(orchestrator, json, e)),
    }
}

/// Execute `headsong headlines`
pub async fn execute_headlines_command(config: &Config, json: bool) -> Result<ExitCode> {
    let orchestrator = build_orchestrator(config)?;
    fetch(&orchestrator, json).await?;

    let snapshot = orchestrator.snapshot();
    if json {
        print_snapshot_json(&snapshot)?;
    } else {
        print_headlines(&snapshot);
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute `headsong lyrics --select ...`
pub async fn execute_lyrics_command(
    config: &Config,
    indices: &[usize],
    json: bool,
) -> Result<ExitCode> {
    let orchestrator = build_orchestrator(config)?;
    fetch(&orchestrator, json).await?;
    select(&orchestrator, indices, json)?;
    lyrics(&orchestrator, json).await?;

    let snapshot = orchestrator.snapshot();
    if json {
        print_snapshot_json(&snapshot)?;
    } else {
        print_headlines(&snapshot);
        println!();
        println!("{}", snapshot.lyrics.as_deref().unwrap_or_default());
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute `headsong run --select ...`
pub async fn execute_run_command(
    config: &Config,
    indices: &[usize],
    json: bool,
) -> Result<ExitCode> {
    let orchestrator = build_orchestrator(config)?;
    fetch(&orchestrator, json).await?;
    select(&orchestrator, indices, json)?;
    lyrics(&orchestrator, json).await?;

    let outcome = match orchestrator.generate_song().await {
        Ok(outcome) => outcome,
        Err(e) => return Err(stage_failed(&orchestrator, json, e)),
    };

    let snapshot = orchestrator.snapshot();
    if json {
        print_snapshot_json(&snapshot)?;
        return Ok(ExitCode::SUCCESS);
    }

    print_headlines(&snapshot);
    println!();
    println!("{}", snapshot.lyrics.as_deref().unwrap_or_default());
    println!();
    match outcome {
        SongOutcome::Ready(url) => {
            print_status(&orchestrator);
            println!("Song: {url}");
        }
        SongOutcome::Pending(payload) => {
            print_status(&orchestrator);
            println!("Song generation in progress:");
            println!("{}", pretty(&payload));
        }
        SongOutcome::Partial { raw } => {
            eprintln!("⚠ Song service returned neither an audio URL nor a task id");
            println!("Raw response:");
            println!("{}", pretty(&raw));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute `headsong doctor`
pub async fn execute_doctor_command(config: &Config, probe: bool, json: bool) -> Result<ExitCode> {
    let doctor = DoctorCommand::new(config.clone());
    let output = if probe {
        let adapters = Adapters::from_config(config).map_err(HeadsongError::from)?;
        doctor.run_with_probes(&adapters).await
    } else {
        doctor.run_with_options()
    };

    if json {
        let json_output = emit_jcs(&output).context("Failed to emit doctor JSON")?;
        println!("{json_output}");
    } else {
        print_doctor_report(&output);
        if !output.ok {
            println!();
            println!("Some checks failed. Please address the issues above before using headsong.");
        }
    }

    Ok(DoctorCommand::exit_code(&output))
}

fn print_doctor_report(report: &DoctorOutput) {
    println!("headsong health check");
    println!();

    for check in &report.checks {
        let symbol = match check.status {
            CheckStatus::Pass => "✓",
            CheckStatus::Warn => "⚠",
            CheckStatus::Fail => "✗",
        };
        println!("{symbol} {}: {}", check.name, check.details);
    }

    let count = |status: CheckStatus| report.checks.iter().filter(|c| c.status == status).count();
    println!();
    println!(
        "{} passed, {} warnings, {} failed",
        count(CheckStatus::Pass),
        count(CheckStatus::Warn),
        count(CheckStatus::Fail)
    );
}
