//! `cascade resolve` - full resolution pipeline

use super::{parse_fields, render};
use crate::error::Result;
use cascade_core::CascadeResolver;

pub fn run_resolve(
    template: &str,
    dir: &str,
    fields: &[String],
    substitute: bool,
    json: bool,
) -> Result<()> {
    let context = parse_fields(fields)?;
    let resolver = CascadeResolver::new(dir).with_context(context);

    let merged = resolver.resolve(template, substitute)?;
    print!("{}", render(&merged, json)?);
    Ok(())
}
