//! §4.10: `unregistered := configured − registered − pending`, order-preserving over the
//! CSV-configured key list.

use std::collections::HashSet;

/// Pure in its three inputs. `configured` dictates output order; `registered` and `pending`
/// are consulted only for membership.
pub fn compute(
    configured: &[[u8; 48]],
    registered: &HashSet<[u8; 48]>,
    pending: &HashSet<[u8; 48]>,
) -> Vec<[u8; 48]> {
    configured
        .iter()
        .filter(|key| !registered.contains(*key) && !pending.contains(*key))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_registered_and_pending_preserving_csv_order() {
        let configured = vec![[1u8; 48], [2u8; 48], [3u8; 48]];
        let mut registered = HashSet::new();
        registered.insert([2u8; 48]);
        let mut pending = HashSet::new();
        pending.insert([3u8; 48]);

        let result = compute(&configured, &registered, &pending);
        assert_eq!(result, vec![[1u8; 48]]);
    }

    #[test]
    fn returns_everything_when_nothing_is_registered_or_pending() {
        let configured = vec![[1u8; 48], [2u8; 48]];
        let result = compute(&configured, &HashSet::new(), &HashSet::new());
        assert_eq!(result, configured);
    }
}
