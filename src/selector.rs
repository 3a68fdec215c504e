//! Uniform random selection over a message pool.

use rand::Rng;

/// Pick one element uniformly at random.
///
/// A single-element slice returns its element without touching `rng`, so
/// single-message pools stay reproducible. Returns `None` only for an empty
/// slice, which loaded pools never are.
pub fn pick<'a, T, R>(pool: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    match pool.len() {
        0 => None,
        1 => pool.first(),
        len => pool.get(rng.gen_range(0..len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// RNG that fails the test if anything draws from it
    struct NoEntropy;

    impl RngCore for NoEntropy {
        fn next_u32(&mut self) -> u32 {
            panic!("entropy consumed")
        }
        fn next_u64(&mut self) -> u64 {
            panic!("entropy consumed")
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("entropy consumed")
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            panic!("entropy consumed")
        }
    }

    #[test]
    fn test_single_element_never_consumes_entropy() {
        let pool = vec!["only".to_string()];
        let mut rng = NoEntropy;
        for _ in 0..100 {
            assert_eq!(pick(&pool, &mut rng).map(String::as_str), Some("only"));
        }
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let pool: Vec<String> = Vec::new();
        assert!(pick(&pool, &mut NoEntropy).is_none());
    }

    #[test]
    fn test_every_element_reachable() {
        let pool = vec!["a", "b", "c"];
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(*pick(&pool, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }
}
