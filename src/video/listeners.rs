//! Per-slot fault callbacks, created once and reused across replacements.

use std::collections::HashMap;

/// Holds one callback per slot. Installing a new player into a slot reuses
/// the slot's callback, so repeated replacements do not grow the set.
#[derive(Debug)]
pub struct SlotListeners<T> {
    by_slot: HashMap<usize, T>,
}

impl<T> Default for SlotListeners<T> {
    fn default() -> Self {
        Self {
            by_slot: HashMap::new(),
        }
    }
}

impl<T> SlotListeners<T> {
    /// The callback for `slot`, made with `make` the first time it is asked for.
    pub fn for_slot(&mut self, slot: usize, make: impl FnOnce(usize) -> T) -> &T {
        self.by_slot.entry(slot).or_insert_with(|| make(slot))
    }

    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_slot_gets_one_callback_however_often_it_is_refilled() {
        let mut listeners = SlotListeners::default();
        let mut made = 0;
        for _round in 0..10 {
            for slot in 0..3 {
                let id = *listeners.for_slot(slot, |s| {
                    made += 1;
                    s * 100
                });
                assert_eq!(id, slot * 100);
            }
        }
        assert_eq!(made, 3);
        assert_eq!(listeners.len(), 3);
    }
}
