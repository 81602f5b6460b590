//! `cascade chain` - show the override chain for a template

use super::parse_fields;
use crate::error::{CliError, Result};
use cascade_core::CascadeResolver;
use colored::Colorize;

pub fn run_chain(template: &str, dir: &str, fields: &[String]) -> Result<()> {
    let context = parse_fields(fields)?;
    let resolver = CascadeResolver::new(dir).with_context(context);

    let key_file = resolver
        .key_file(template)?
        .ok_or_else(|| CliError::user(format!("no config file matched '{template}' in {dir}")))?;
    let chain = resolver.expand_chain(&key_file)?;

    println!("{} {}", "key file:".green().bold(), key_file);
    for (index, file) in chain.iter().enumerate() {
        println!("{index:>3}  {file}");
    }
    Ok(())
}
