//! B3/S23 transition rule.

/// Next state of a cell given its previous state and live-neighbor count.
#[inline(always)]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    match (alive, neighbors) {
        (true, 2) | (true, 3) => true,
        (false, 3) => true,
        _ => false,
    }
}
