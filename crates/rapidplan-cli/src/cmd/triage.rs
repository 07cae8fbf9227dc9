use crate::output::print_json;
use rapidplan_core::triage::triage;

pub fn run(description: &str, json: bool) -> anyhow::Result<()> {
    let verdict = triage(description);
    if json {
        return print_json(&verdict);
    }
    match &verdict.reason {
        Some(reason) if verdict.is_complex => {
            println!("complex: {reason}");
            println!("  matched: {}", verdict.matched_keywords.join(", "));
        }
        _ => println!("simple: suitable for rapid mode"),
    }
    Ok(())
}
