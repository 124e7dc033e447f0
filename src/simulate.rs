//! Random readings for demos and load generation.

use rand::Rng;

use crate::models::Measurements;

// ---

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Plausible indoor readings spanning both sides of every threshold.
pub fn random_measurements<R: Rng + ?Sized>(rng: &mut R) -> Measurements {
    // ---
    Measurements {
        pm25: Some(round_to(rng.random_range(2.0..120.0), 1)),
        co2: Some(f64::from(rng.random_range(400_u32..=2000))),
        tvoc: Some(round_to(rng.random_range(10.0..600.0), 1)),
        humidity: Some(round_to(rng.random_range(20.0..75.0), 1)),
        temperature: Some(round_to(rng.random_range(16.0..30.0), 1)),
        mold_risk: Some(round_to(rng.random_range(0.0..=1.0), 2)),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn values_stay_within_ingest_limits() {
        // ---
        let mut rng = rand::rng();
        for _ in 0..200 {
            let m = random_measurements(&mut rng);
            let pm25 = m.pm25.unwrap();
            let co2 = m.co2.unwrap();
            let humidity = m.humidity.unwrap();
            let mold = m.mold_risk.unwrap();
            assert!((2.0..=120.0).contains(&pm25));
            assert!((400.0..=2000.0).contains(&co2));
            assert!((20.0..=75.0).contains(&humidity));
            assert!((0.0..=1.0).contains(&mold));
        }
    }

    #[test]
    fn rounding() {
        // ---
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(0.555, 2), 0.56);
    }
}
