use crate::output::{print_json, print_list};
use rapidplan_core::stack::detect_stack;
use std::path::Path;

pub fn run(root: &Path, packages: &[String], json: bool) -> anyhow::Result<()> {
    let stack = detect_stack(root);
    let required: Vec<&str> = packages.iter().map(String::as_str).collect();
    let check = stack.dependencies.check(&required);
    if json {
        return print_json(&check);
    }
    print_list("Available", &check.available);
    print_list("Missing", &check.missing);
    Ok(())
}
