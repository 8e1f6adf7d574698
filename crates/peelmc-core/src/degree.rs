use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::{Error, Result};

/// Discrete distribution over packet degrees.
///
/// Weight `i` is the relative likelihood of drawing degree `i`.
#[derive(Clone, Debug)]
pub struct DegreeSampler {
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl DegreeSampler {
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidWeights("no weights supplied".to_string()));
        }
        if let Some((degree, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(Error::InvalidWeights(format!(
                "weight {w} for degree {degree} is not a finite non-negative number"
            )));
        }
        let index =
            WeightedIndex::new(&weights).map_err(|e| Error::InvalidWeights(e.to_string()))?;
        Ok(Self { weights, index })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index.sample(rng)
    }

    /// Largest degree with positive weight.
    pub fn max_degree(&self) -> usize {
        self.weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
    }

    pub fn probability(&self, degree: usize) -> f64 {
        let total: f64 = self.weights.iter().sum();
        self.weights.get(degree).map_or(0.0, |w| w / total)
    }

    /// Whether a trial can ever resolve a hop.
    ///
    /// Peeling starts only from a packet with exactly one unknown hop; with no
    /// degree-1 weight the first packet to carry information is ambiguous and
    /// nothing is ever resolved.
    pub fn can_resolve(&self) -> bool {
        self.weights.get(1).is_some_and(|&w| w > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn rejects_bad_weights() {
        assert!(DegreeSampler::new(vec![]).is_err());
        assert!(DegreeSampler::new(vec![0.0, 0.0]).is_err());
        assert!(DegreeSampler::new(vec![1.0, -0.5]).is_err());
        assert!(DegreeSampler::new(vec![1.0, f64::NAN]).is_err());
        assert!(DegreeSampler::new(vec![1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn point_mass_always_draws_its_degree() {
        let sampler = DegreeSampler::new(vec![0.0, 0.0, 3.0]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!((0..200).all(|_| sampler.sample(&mut rng) == 2));
        assert_eq!(sampler.max_degree(), 2);
        assert!(!sampler.can_resolve());
    }

    #[test]
    fn empirical_frequencies_follow_weights() {
        let sampler = DegreeSampler::new(vec![1.0, 2.0, 1.0]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let n = 40_000;
        let mut hist = [0usize; 3];
        for _ in 0..n {
            hist[sampler.sample(&mut rng)] += 1;
        }
        assert_relative_eq!(hist[1] as f64 / n as f64, 0.5, epsilon = 0.02);
        assert_relative_eq!(sampler.probability(1), 0.5);
        assert_eq!(sampler.probability(9), 0.0);
        assert!(sampler.can_resolve());
    }
}
