//! Override-chain expansion via parent references
//!
//! Every document may name a logical predecessor in `info.parent`. The
//! chain walker follows those references upwards and returns the full
//! ancestry root-first, so the merge engine can fold it from least to
//! most specific.

use crate::context::Context;
use crate::error::Result;
use crate::template;
use cascade_fs::{DocumentStore, NormalizedPath};

/// Upper bound on parent hops. Malformed chains stop here instead of
/// walking forever; the truncation is logged, not escalated.
pub const MAX_CHAIN_HOPS: usize = 100;

/// Expand a file into its override chain, root-most ancestor first.
///
/// A missing start file yields an empty chain. Context tokens inside a
/// parent reference are substituted (forced) before the reference is
/// resolved. References are resolved against the referencing file
/// itself, so a sibling document is written `../sibling.yml`; absolute
/// references stand alone. The walk stops when a document declares no
/// parent, when the referenced file does not exist, when a file repeats
/// (cycle), or at [`MAX_CHAIN_HOPS`].
pub fn expand_chain(
    store: &DocumentStore,
    start: &NormalizedPath,
    context: Option<&Context>,
) -> Result<Vec<NormalizedPath>> {
    if !start.is_file() {
        return Ok(Vec::new());
    }

    let mut chain = vec![start.clone()];
    let mut current = start.clone();
    let mut document = store.read(&current)?;

    for hop in 0.. {
        let Some(reference) = document.info.parent.clone() else {
            break;
        };
        let reference = match context {
            Some(context) => template::substitute(&reference, context, true)
                .unwrap_or(reference),
            None => reference,
        };

        let parent = resolve_reference(&current, &reference);
        if !parent.is_file() {
            tracing::debug!(parent = %parent, "parent reference does not exist, chain stops");
            break;
        }
        if chain.contains(&parent) {
            tracing::warn!(parent = %parent, "cycle in parent chain, truncating walk");
            break;
        }
        if hop >= MAX_CHAIN_HOPS {
            tracing::warn!(start = %start, "parent chain exceeded {MAX_CHAIN_HOPS} hops, truncating walk");
            break;
        }

        document = store.read(&parent)?;
        chain.insert(0, parent.clone());
        current = parent;
    }

    Ok(chain)
}

/// Resolve a parent reference against the referencing file.
fn resolve_reference(current: &NormalizedPath, reference: &str) -> NormalizedPath {
    let referenced = NormalizedPath::new(reference);
    if referenced.is_absolute() {
        referenced.normalize()
    } else {
        current.join(reference).normalize()
    }
}
