use std::sync::Arc;

use crate::device::Device;
use crate::errors::LookupError;
use crate::item::Item;

/// Linear scan for the first item whose device reports `has_guid(guid)`.
/// No tie-breaking beyond insertion order: GUID uniqueness across devices
/// is the caller's concern, not the registry's.
pub(crate) fn find_by_guid<D: Device>(
    items: &[Item<D>],
    guid: &str,
) -> Result<Arc<D>, LookupError> {
    items
        .iter()
        .find(|item| item.device.has_guid(guid))
        .map(|item| item.device.clone())
        .ok_or_else(|| LookupError::GuidNotFound {
            guid: guid.to_string(),
        })
}

/// Whether `candidate`'s first `query.len()` bytes equal `query`,
/// byte-exact. A candidate shorter than the query can never match
/// (mirrors C's `strncmp` semantics on a shorter, NUL-terminated string).
/// An empty query matches every non-empty candidate.
fn prefix_matches(candidate: &str, query: &str) -> bool {
    let len = query.len();
    candidate.len() >= len && candidate.as_bytes()[..len] == query.as_bytes()[..len]
}

/// Abbreviated-identifier lookup. Ambiguity is tracked per *item*, not per
/// candidate string: if both `id()` and `equivalent_id()` of the same item
/// prefix-match, that is not ambiguous. Two or more distinct items
/// prefix-matching is.
pub(crate) fn find_by_id<D: Device>(items: &[Item<D>], query: &str) -> Result<Arc<D>, LookupError> {
    let mut found: Option<&Item<D>> = None;
    let mut ambiguous = false;

    for item in items {
        let candidates = [Some(item.device.id()), item.device.equivalent_id()];
        let item_matches = candidates
            .into_iter()
            .flatten()
            .any(|candidate| prefix_matches(candidate, query));

        if item_matches {
            if found.is_some() {
                ambiguous = true;
            }
            found = Some(item);
        }
    }

    match (found, ambiguous) {
        (None, _) => Err(LookupError::DeviceIdNotFound {
            id: query.to_string(),
        }),
        (Some(_), true) => Err(LookupError::DeviceIdNotUnique {
            id: query.to_string(),
        }),
        (Some(item), false) => Ok(item.device.clone()),
    }
}
