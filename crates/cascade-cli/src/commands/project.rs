//! `cascade project` - assemble a project environment

use super::render;
use crate::error::Result;
use cascade_core::ProjectManager;
use colored::Colorize;

pub fn run_project(
    project: &str,
    root: &str,
    variation: &str,
    tool: Option<&str>,
    json: bool,
) -> Result<()> {
    let manager = ProjectManager::new(root);
    let environment = manager.load(project, variation, tool)?;

    eprintln!(
        "{} {} {} {}",
        "selection:".green().bold(),
        project,
        variation,
        tool.unwrap_or("-")
    );
    for file in &environment.config_files {
        eprintln!("  {file}");
    }

    print!("{}", render(&environment.config, json)?);
    Ok(())
}
