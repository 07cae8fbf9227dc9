use crate::output::{or_dash, print_json};
use anyhow::Context;
use rapidplan_core::config::PlannerConfig;
use rapidplan_core::project::init_project;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = PlannerConfig::load(root).context("failed to load planner config")?;
    let report = init_project(root, &config.template).context("project init failed")?;
    if json {
        return print_json(&report);
    }

    let p = &report.profile;
    println!("Project type: {}", p.kind.describe());
    println!("  name:       {}", p.project_name);
    println!("  language:   {}", or_dash(p.language.as_deref()));
    println!("  framework:  {}", or_dash(p.framework.as_deref()));
    println!("  database:   {}", or_dash(p.database.as_deref()));
    println!("  repository: {}", p.git.repository_url);
    if !p.structure.is_empty() {
        println!("  structure:  {}", p.structure.join(", "));
    }
    println!();

    let status = |updated: bool| if updated { "updated" } else { "missing" };
    println!("  {}: CLAUDE.md", status(report.claude_md_updated));
    println!("  {}: {}", status(report.template_updated), config.template.display());
    println!();

    println!("Commands:");
    for (slot, command) in p.commands.slots() {
        println!("  {slot:<20} {command}");
    }
    println!();

    for tool in &report.tools {
        if tool.available {
            println!("  ok:      {}", tool.tool);
        } else {
            println!("  missing: {} ({})", tool.tool, tool.hint);
        }
    }
    Ok(())
}
