//! Property-based tests for the servo angle mapping.

use cardlock_servo::ServoConfig;
use proptest::prelude::*;

proptest! {
    #[test]
    fn duty_cycle_is_monotonic(a in 0.0f64..=180.0, b in 0.0f64..=180.0) {
        let config = ServoConfig::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(config.duty_cycle(low) <= config.duty_cycle(high));
    }

    #[test]
    fn duty_cycle_stays_within_pulse_bounds(angle in -360.0f64..=360.0) {
        let config = ServoConfig::default();
        let duty = config.duty_cycle(angle);
        prop_assert!((2.5..=12.5).contains(&duty), "duty {} out of bounds", duty);
    }

    #[test]
    fn out_of_range_angles_clamp(excess in 0.001f64..1_000.0) {
        let config = ServoConfig::default();
        prop_assert_eq!(config.duty_cycle(-excess), config.duty_cycle(0.0));
        prop_assert_eq!(config.duty_cycle(180.0 + excess), config.duty_cycle(180.0));
    }

    #[test]
    fn custom_pulse_range_hits_endpoints(
        min in 400.0f64..1_000.0,
        span in 500.0f64..1_500.0,
        frequency in 40.0f64..=60.0,
    ) {
        let config = ServoConfig::default()
            .with_pulse_range(min, min + span)
            .with_frequency(frequency);
        prop_assert!(config.validate().is_ok());

        let period = 1_000_000.0 / frequency;
        prop_assert!((config.duty_cycle(0.0) - min / period * 100.0).abs() < 1e-9);
        prop_assert!((config.duty_cycle(180.0) - (min + span) / period * 100.0).abs() < 1e-9);
    }
}
