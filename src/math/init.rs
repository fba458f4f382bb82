use rand::Rng;
use std::f32::consts::PI;

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // Both draws lie in (0, 1] so ln() never sees zero.
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = 1.0 - rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn normal_buffer<R: Rng + ?Sized>(len: usize, std_dev: f32, rng: &mut R) -> Vec<f32> {
    (0..len).map(|_| sample_standard_normal(rng) * std_dev).collect()
}

/// He initialization: `len` samples from N(0, sqrt(2 / fan_in)).
///
/// Use before ReLU layers; the factor 2 compensates for ReLU zeroing half of
/// its inputs on average.
pub fn he_normal<R: Rng + ?Sized>(len: usize, fan_in: usize, rng: &mut R) -> Vec<f32> {
    normal_buffer(len, (2.0 / fan_in as f32).sqrt(), rng)
}

/// LeCun initialization: `len` samples from N(0, sqrt(1 / fan_in)).
///
/// Used for the linear output layer that feeds the softmax.
pub fn lecun_normal<R: Rng + ?Sized>(len: usize, fan_in: usize, rng: &mut R) -> Vec<f32> {
    normal_buffer(len, (1.0 / fan_in as f32).sqrt(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn he_normal_has_expected_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        let fan_in = 50;
        let values = he_normal(20_000, fan_in, &mut rng);

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;

        assert!(mean.abs() < 0.01, "mean {}", mean);
        assert!((var - 2.0 / fan_in as f32).abs() < 0.005, "variance {}", var);
    }

    #[test]
    fn same_seed_same_weights() {
        let a = lecun_normal(64, 8, &mut StdRng::seed_from_u64(3));
        let b = lecun_normal(64, 8, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.is_finite()));
    }
}
