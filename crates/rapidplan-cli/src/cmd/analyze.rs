use crate::output::{or_dash, print_json, print_list, print_table};
use rapidplan_core::summary::analyze;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let analysis = analyze(root);
    let summary = analysis.summary();

    if json {
        #[derive(serde::Serialize)]
        struct AnalyzeOutput<'a> {
            root: &'a Path,
            #[serde(flatten)]
            analysis: &'a rapidplan_core::summary::Analysis,
            summary: &'a rapidplan_core::summary::CodebaseSummary,
        }
        return print_json(&AnalyzeOutput {
            root,
            analysis: &analysis,
            summary: &summary,
        });
    }

    let ecosystem = summary.ecosystem.map(|e| e.as_str());
    println!("Ecosystem:  {}", or_dash(ecosystem));
    println!("Language:   {}", or_dash(summary.language.as_deref()));
    println!("Framework:  {}", or_dash(summary.framework.as_deref()));
    println!("ORM:        {}", or_dash(summary.orm.as_deref()));
    println!("Packages:   {}", summary.available_packages.len());
    println!();

    let patterns: Vec<String> = summary.patterns.iter().map(|p| p.to_string()).collect();
    print_list("Patterns", &patterns);
    let endpoints: Vec<String> = summary
        .api_endpoints
        .iter()
        .map(|e| format!("/api/{e}"))
        .collect();
    print_list("API endpoints", &endpoints);
    println!();

    if analysis.patterns.components.is_empty() {
        println!("Components: (none)");
    } else {
        let rows: Vec<Vec<String>> = analysis
            .patterns
            .components
            .iter()
            .map(|c| vec![c.name.clone(), c.path.clone(), c.files.join(", ")])
            .collect();
        print_table(&["COMPONENT", "PATH", "FILES"], &rows);
    }
    println!();

    let c = &summary.commands;
    print_table(
        &["COMMAND", "VALUE"],
        &[
            vec!["build".into(), c.build.clone()],
            vec!["lint".into(), c.lint.clone()],
            vec!["format".into(), c.format.clone()],
            vec!["test".into(), c.test.clone()],
            vec!["typecheck".into(), c.typecheck.clone()],
        ],
    );
    Ok(())
}
