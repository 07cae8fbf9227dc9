use crate::output::print_json;
use anyhow::Context;
use rapidplan_core::config::PlannerConfig;
use rapidplan_core::planner::{PlanOutcome, RapidPlanner};
use rapidplan_core::publish::GhCliPublisher;
use rapidplan_core::triage::ComplexityVerdict;
use std::path::Path;

pub fn run(root: &Path, description: &str, force: bool, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = PlannerConfig::load(root).context("failed to load planner config")?;
    let publisher = GhCliPublisher::new(config.issue.program.clone());
    let planner = RapidPlanner::new(root, config, publisher);

    let outcome = if dry_run {
        planner.dry_run(description, force)
    } else {
        planner.run(description, force)
    }
    .context("rapid planning failed")?;

    if json {
        print_json(&outcome)?;
    }

    match outcome {
        PlanOutcome::Rejected { verdict } => {
            if !json {
                print_rejection(description, &verdict);
            }
            anyhow::bail!("task too complex for rapid mode");
        }
        PlanOutcome::Drafted { draft } => {
            if !json {
                if draft.forced {
                    println!("forced: task appears complex for rapid mode");
                }
                println!("title:  {}", draft.title);
                println!("labels: {}", draft.labels.join(", "));
                println!();
                print!("{}", draft.body);
            }
        }
        PlanOutcome::Created {
            forced,
            title,
            locator,
            ..
        } => {
            if !json {
                if forced {
                    println!("forced: task appears complex for rapid mode");
                }
                println!("created: {title}");
                match locator {
                    Some(url) => println!("  issue: {url}"),
                    None => println!("  issue: (no URL reported)"),
                }
                println!("Ready for implementation with /impl [issue-number]");
            }
        }
    }
    Ok(())
}

fn print_rejection(description: &str, verdict: &ComplexityVerdict) {
    let reason = verdict.reason.as_deref().unwrap_or("complex task");
    println!("Task too complex for rapid mode: {reason}");
    if !verdict.matched_keywords.is_empty() {
        println!("  matched: {}", verdict.matched_keywords.join(", "));
    }
    println!("  Use /plan \"{description}\" instead");
    println!("  Or force with: rapidplan rapid \"{description}\" --force");
}
