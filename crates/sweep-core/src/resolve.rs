//! Pure resolution layer: canonical ids and alias sets.
//!
//! No I/O here; both functions take the rename map by reference so callers
//! decide when the map is refreshed.

use std::collections::{BTreeSet, HashSet};

use crate::rename_map::RenameMap;

/// Follow the rename chain from `id` to its end and return the canonical
/// id, i.e. the last identifier visited before the next hop is absent or
/// would revisit an earlier one.
///
/// The visited set guards against cycles in untrusted map data, so this
/// terminates in at most `map.len()` hops. A blank input resolves to the
/// empty string.
pub fn resolve_canonical(id: &str, map: &RenameMap) -> String {
    let start = id.trim();
    if start.is_empty() {
        return String::new();
    }
    let mut current = start;
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(current);
    while let Some(next) = map.get(current) {
        let next = next.trim();
        if next.is_empty() || visited.contains(next) {
            break;
        }
        visited.insert(next);
        current = next;
    }
    current.to_string()
}

/// Every identifier that resolves to the same canonical id as `id`,
/// including the canonical id itself. Empty input yields an empty set.
pub fn aliases_of(id: &str, map: &RenameMap) -> BTreeSet<String> {
    let canonical = resolve_canonical(id, map);
    let mut aliases = BTreeSet::new();
    if canonical.is_empty() {
        return aliases;
    }
    aliases.insert(canonical.clone());
    for from in map.keys() {
        if resolve_canonical(from, map) == canonical {
            aliases.insert(from.clone());
        }
    }
    aliases
}
