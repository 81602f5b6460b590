//! `cascade trace` - resolve with provenance tags

use super::{parse_fields, render};
use crate::error::{CliError, Result};
use cascade_core::CascadeResolver;

pub fn run_trace(template: &str, dir: &str, fields: &[String], json: bool) -> Result<()> {
    let context = parse_fields(fields)?;
    let resolver = CascadeResolver::new(dir).with_context(context);

    let key_file = resolver
        .key_file(template)?
        .ok_or_else(|| CliError::user(format!("no config file matched '{template}' in {dir}")))?;
    let chain = resolver.expand_chain(&key_file)?;
    let merged = resolver.fold_chain(&chain, false)?;
    let annotated = resolver.annotate(merged, &chain)?;

    print!("{}", render(&annotated, json)?);
    Ok(())
}
