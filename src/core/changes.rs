//! Planned change aggregation
//!
//! Collapses a build's change list into per-resource-type target counts.

use std::collections::BTreeMap;

use super::event::{BuildKind, Change};

/// Count planned changes per resource type.
///
/// Keys iterate in lexicographic order so display rows keep a stable
/// position across redraws.
pub fn aggregate(changes: &[Change]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for change in changes {
        *counts.entry(change.component_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Initial target counts for a build of the given kind.
///
/// Imports discover resources instead of creating a known number of them,
/// so every target starts at zero.
pub fn targets(kind: BuildKind, changes: &[Change]) -> BTreeMap<String, usize> {
    let mut counts = aggregate(changes);
    if kind == BuildKind::Import {
        counts.values_mut().for_each(|count| *count = 0);
    }
    counts
}

/// Display label for a resource type: `network` becomes `networks`.
pub fn plural_label(component_type: &str) -> String {
    let lower = component_type.to_lowercase().replace('_', " ");
    if lower.ends_with(['s', 'x']) || lower.ends_with("sh") || lower.ends_with("ch") {
        return format!("{lower}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    format!("{lower}s")
}
