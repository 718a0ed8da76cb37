//! Compliment table and sampling

use rand::seq::SliceRandom;
use rand::Rng;

/// Fixed list compliments are drawn from
pub const COMPLIMENTS: [&str; 23] = [
    "awesome",
    "beatific",
    "blithesome",
    "conscientious",
    "coruscant",
    "erudite",
    "exquisite",
    "fabulous",
    "fantastic",
    "gorgeous",
    "indubitable",
    "ineffable",
    "magnificent",
    "outstanding",
    "propitioius",
    "remarkable",
    "spectacular",
    "splendiferous",
    "stupendous",
    "super",
    "upbeat",
    "wondrous",
    "zoetic",
];

/// Largest number of distinct compliments one request can ask for
pub const MAX_COMPLIMENTS: usize = COMPLIMENTS.len();

/// Draw `count` distinct compliments without replacement.
///
/// `count` is expected to be validated against `MAX_COMPLIMENTS`; larger
/// values are capped at the table size.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    COMPLIMENTS
        .choose_multiple(rng, count.min(MAX_COMPLIMENTS))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_draw_exact_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=MAX_COMPLIMENTS {
            let drawn = draw(&mut rng, n);
            assert_eq!(drawn.len(), n);
            let unique: HashSet<_> = drawn.iter().collect();
            assert_eq!(unique.len(), n);
            assert!(drawn.iter().all(|c| COMPLIMENTS.contains(c)));
        }
    }

    #[test]
    fn test_draw_whole_table() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut drawn = draw(&mut rng, MAX_COMPLIMENTS);
        drawn.sort_unstable();
        let mut all = COMPLIMENTS.to_vec();
        all.sort_unstable();
        assert_eq!(drawn, all);
    }

    #[test]
    fn test_draw_is_capped() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw(&mut rng, 100).len(), MAX_COMPLIMENTS);
        assert!(draw(&mut rng, 0).is_empty());
    }
}
