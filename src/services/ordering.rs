use uuid::Uuid;

/// Given siblings sorted by their current position, returns the `(id, new_position)` pairs that
/// make positions contiguous from 1. Siblings that are already in place are omitted.
pub(crate) fn renumber_plan(siblings: &[(Uuid, i32)]) -> Vec<(Uuid, i32)> {
    siblings
        .iter()
        .zip(1..)
        .filter(|((_, current), expected)| current != expected)
        .map(|((id, _), expected)| (*id, expected))
        .collect()
}
