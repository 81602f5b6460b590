//! Template token extraction, matching, and substitution
//!
//! Templates are strings carrying placeholder tokens of the form
//! `<name>` or `<name{modifier}>`, e.g. `<episode>_<scene>_<cut>`.
//! This module turns templates into concrete names (substitution) and
//! concrete names back into field values (matching).

use crate::context::Context;
use crate::transform::TokenTransform;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Bracketed token grammar: letters, digits, dots, underscores, and
/// `{}` modifier blocks between angle brackets.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[A-Za-z0-9._{}]+>").expect("valid token pattern"))
}

/// Extract all tokens from a template, left to right.
///
/// Duplicates are preserved: a repeated token appears once per
/// occurrence, since each must be substituted.
pub fn extract_tokens(template: &str) -> Vec<String> {
    token_pattern()
        .find_iter(template)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Split a modifier token into its base token and modifier name.
///
/// `<shot{scene}>` yields `("<shot>", "scene")`. Returns `None` for
/// tokens without a modifier block.
pub fn token_modifier(token: &str) -> Option<(String, String)> {
    let inner = token.strip_prefix('<')?.strip_suffix('>')?;
    let open = inner.find('{')?;
    let close = inner.rfind('}')?;
    if close < open {
        return None;
    }
    Some((
        format!("<{}>", &inner[..open]),
        inner[open + 1..close].to_string(),
    ))
}

/// Match a concrete value against a template, capturing field values.
///
/// Builds a pattern with every token replaced by a wildcard capture and
/// matches case-insensitively. Returns `None` when the literal parts of
/// the template do not align with the value, or when any captured field
/// contains a literal underscore: a capture swallowing the segment
/// separator would make field boundaries ambiguous, so the whole match
/// is rejected.
pub fn match_template(template: &str, value: &str) -> Option<BTreeMap<String, String>> {
    let tokens = extract_tokens(template);

    let mut pattern = String::from("(?i)^");
    let mut rest = template;
    for token in &tokens {
        let idx = rest.find(token.as_str())?;
        pattern.push_str(&regex::escape(&rest[..idx]));
        pattern.push_str("(.*)");
        rest = &rest[idx + token.len()..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    let matcher = Regex::new(&pattern).ok()?;
    let captures = matcher.captures(value)?;

    let mut fields = BTreeMap::new();
    for (i, token) in tokens.iter().enumerate() {
        let captured = captures.get(i + 1)?.as_str();
        if captured.contains('_') {
            return None;
        }
        fields.insert(token.clone(), captured.to_string());
    }
    Some(fields)
}

/// Substitute context values into a template.
///
/// Every token present in the context is replaced by its value. With
/// `force` false the result is `None` if any token remains unresolved;
/// with `force` true the string is always returned, remaining tokens
/// left literally in place.
pub fn substitute(template: &str, context: &Context, force: bool) -> Option<String> {
    substitute_with(template, context, force, None)
}

/// [`substitute`] with a pluggable per-token transform.
///
/// The transform receives the tokens still unresolved after the first
/// substitution pass together with a copy of the context, may inject
/// derived key/value pairs (e.g. splitting a composite value into
/// sub-fields keyed by a modifier suffix), and substitution is retried
/// once with the augmented context. The caller's context is never
/// mutated.
pub fn substitute_with(
    template: &str,
    context: &Context,
    force: bool,
    transform: Option<&dyn TokenTransform>,
) -> Option<String> {
    let mut resolved = replace_known(template, context);

    if let Some(transform) = transform {
        let unresolved = extract_tokens(&resolved);
        let mut derived = context.clone();
        transform.apply(&unresolved, &mut derived);
        resolved = replace_known(&resolved, &derived);
    }

    if !force && token_pattern().is_match(&resolved) {
        return None;
    }
    Some(resolved)
}

fn replace_known(template: &str, context: &Context) -> String {
    let mut out = template.to_string();
    for (token, value) in context.iter() {
        if out.contains(token) {
            out = out.replace(token, value);
        }
    }
    out
}
