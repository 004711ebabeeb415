// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It drives mutation noise and parent selection, and makes runs reproducible
// from a seed.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let state = if seed == 0 {
            ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in [0, 1), 53 bits of mantissa.
    #[inline]
    pub fn next_f64_01(&mut self) -> f64 {
        let x = self.next_u64() >> 11;
        (x as f64) / ((1u64 << 53) as f64)
    }

    #[inline]
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64_01()
    }

    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64;
        low + (self.next_u64() % span) as usize
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.gen_range_usize(0, items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(7);
        let mut b = Prng::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let mut rng = Prng::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), rng.next_u64());
    }

    #[test]
    fn unit_interval_is_half_open() {
        let mut rng = Prng::new(99);
        for _ in 0..10_000 {
            let x = rng.next_f64_01();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn empty_ranges_collapse_to_low() {
        let mut rng = Prng::new(3);
        assert_eq!(rng.gen_range_usize(5, 5), 5);
        assert_eq!(rng.gen_range_usize(9, 2), 9);
        assert!(rng.choose::<u8>(&[]).is_none());
        for _ in 0..100 {
            let v = rng.gen_range_usize(2, 5);
            assert!((2..5).contains(&v));
        }
    }

    #[test]
    fn choose_reaches_every_item() {
        let mut rng = Prng::new(17);
        let items = [16u32, 32, 64];
        let mut seen = [false; 3];
        for _ in 0..300 {
            let picked = rng.choose(&items).unwrap();
            let idx = items.iter().position(|x| x == picked).unwrap();
            seen[idx] = true;
        }
        assert_eq!(seen, [true; 3]);
    }
}
