use crate::output::print_json;
use rapidplan_core::feasibility::validate_feature;
use rapidplan_core::summary::analyze;
use std::path::Path;

pub fn run(root: &Path, description: &str, json: bool) -> anyhow::Result<()> {
    let summary = analyze(root).summary();
    let validation = validate_feature(description, &summary);
    if json {
        return print_json(&validation);
    }

    if validation.is_realistic {
        println!("realistic: yes");
    } else {
        println!("realistic: no");
    }
    for (missing, recommendation) in validation
        .missing_requirements
        .iter()
        .zip(&validation.recommendations)
    {
        println!("  missing: {missing}");
        println!("    {recommendation}");
    }
    Ok(())
}
