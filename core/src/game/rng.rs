//! Deterministic pseudo-random generator
//!
//! Reproduces the linear congruential generator used by the MS ruleset.
//! Monster AI and random forced floors draw from it, so the cursor is part
//! of every saved state and must round-trip bit-exactly.

/// Multiplier of the generator step.
const MULTIPLIER: u32 = 1_103_515_245;

/// Increment of the generator step.
const INCREMENT: u32 = 12_345;

/// Only the low 31 bits of the cursor are ever live.
const MASK: u32 = 0x7FFF_FFFF;

/// The generator. Its whole state is one 31-bit cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rng {
    value: u32,
}

impl Rng {
    /// Seed a fresh generator from a level's seed.
    pub fn new(seed: u32) -> Self {
        Self { value: seed & MASK }
    }

    /// Restore a generator from a saved cursor.
    pub fn from_cursor(value: u32) -> Self {
        Self { value }
    }

    /// Current cursor, as persisted by the state codec.
    pub fn cursor(&self) -> u32 {
        self.value
    }

    /// Advance the cursor once and return the new value.
    pub fn next_value(&mut self) -> u32 {
        self.value = self
            .value
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.value
    }

    /// Uniform pick in `0..4`, used for random forced floors.
    pub fn random4(&mut self) -> u8 {
        (self.next_value() >> 29) as u8
    }

    /// Rank-permute three elements in place with a single draw.
    pub fn permute3<T>(&mut self, items: &mut [T; 3]) {
        let value = self.next_value();
        items.swap((value >> 30) as usize, 1);
        let (index, _) = next_digit(value, 3);
        items.swap(index, 2);
    }

    /// Rank-permute four elements in place with a single draw. The last two
    /// indices are successive mixed-radix digits of the same draw.
    pub fn permute4<T>(&mut self, items: &mut [T; 4]) {
        let value = self.next_value();
        items.swap((value >> 30) as usize, 1);
        let (index, product) = next_digit(value, 3);
        items.swap(index, 2);
        let (index, _) = next_digit(product, 4);
        items.swap(index, 3);
    }
}

/// Scale the low 28 bits of `value` by `radix`. The top nibble of the
/// product is a digit in `0..radix`; the product itself seeds the next digit.
fn next_digit(value: u32, radix: u32) -> (usize, u32) {
    let product = radix * (value & 0x0FFF_FFFF);
    ((product >> 28) as usize, product)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Independent 64-bit formulation of the same recurrence.
    fn reference_step(value: u64) -> u64 {
        (value * 1_103_515_245 + 12_345) % (1 << 31)
    }

    #[test]
    fn test_known_sequence_from_zero() {
        let mut rng = Rng::new(0);
        let values: Vec<u32> = (0..5).map(|_| rng.next_value()).collect();
        assert_eq!(
            values,
            vec![12345, 1406932606, 654583775, 1449466924, 229283573]
        );
    }

    #[test]
    fn test_matches_reference_for_ten_thousand_calls() {
        let mut rng = Rng::new(0x1234_5678);
        let mut reference = 0x1234_5678u64 & 0x7FFF_FFFF;
        for _ in 0..10_000 {
            reference = reference_step(reference);
            assert_eq!(u64::from(rng.next_value()), reference);
        }
        assert_eq!(rng.cursor(), 1_594_127_016);
    }

    #[test]
    fn test_seed_is_masked() {
        assert_eq!(Rng::new(0xFFFF_FFFF).cursor(), 0x7FFF_FFFF);
        assert_eq!(Rng::from_cursor(0x8000_0001).cursor(), 0x8000_0001);
    }

    #[test]
    fn test_random4_sequence() {
        let mut rng = Rng::new(12345);
        let picks: Vec<u8> = (0..12).map(|_| rng.random4()).collect();
        assert_eq!(picks, vec![2, 1, 2, 0, 2, 1, 2, 1, 1, 1, 3, 0]);
    }

    #[test]
    fn test_permute3_consumes_one_step() {
        let mut rng = Rng::new(1);
        let mut items = [0, 1, 2];
        rng.permute3(&mut items);
        assert_eq!(items, [2, 1, 0]);
        assert_eq!(rng.cursor(), 1_103_527_590);
    }

    #[test]
    fn test_permute4_consumes_one_step() {
        let mut rng = Rng::new(1);
        let mut items = [0, 1, 2, 3];
        rng.permute4(&mut items);
        assert_eq!(items, [2, 3, 0, 1]);
        assert_eq!(rng.cursor(), 1_103_527_590);
    }

    #[test]
    fn test_permute4_sequence_is_reproducible() {
        let expected = [
            [0, 2, 1, 3],
            [2, 3, 0, 1],
            [3, 0, 2, 1],
            [2, 1, 3, 0],
            [3, 2, 0, 1],
            [2, 0, 1, 3],
        ];
        for _ in 0..2 {
            let mut rng = Rng::new(42);
            for want in expected {
                let mut items = [0, 1, 2, 3];
                rng.permute4(&mut items);
                assert_eq!(items, want);
            }
        }
    }

    // ========================================================================
    // Reference vectors over long runs
    // ========================================================================

    /// Fold each permutation into a running hash, one base-4 digit per slot.
    fn fold<const N: usize>(acc: u32, items: [u32; N]) -> u32 {
        let packed = items.iter().fold(0, |packed, &i| packed * 4 + i);
        acc.wrapping_mul(31).wrapping_add(packed)
    }

    #[test]
    fn test_permute3_matches_reference_for_ten_thousand_calls() {
        let mut rng = Rng::new(0x0246_8ACE);
        let mut acc = 0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let mut items = [0, 1, 2];
            rng.permute3(&mut items);
            seen.insert(items);
            acc = fold(acc, items);
        }
        assert_eq!(acc, 1_279_677_194);
        assert_eq!(seen.len(), 6);
        assert_eq!(rng.cursor(), 1_293_160_574);
    }

    #[test]
    fn test_permute4_matches_reference_for_ten_thousand_calls() {
        let mut rng = Rng::new(0x0246_8ACE);
        let mut acc = 0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let mut items = [0, 1, 2, 3];
            rng.permute4(&mut items);
            seen.insert(items);
            acc = fold(acc, items);
        }
        assert_eq!(acc, 259_470_469);
        assert_eq!(seen.len(), 24);
        assert_eq!(rng.cursor(), 1_293_160_574);
    }
}
