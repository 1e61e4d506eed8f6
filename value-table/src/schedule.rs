//! Step size and discount schedules of the backward update.
//!
//! Both decay from 0.95 toward 0.05: frequently visited positions move slowly and positions deep
//! into a game weight their successors less.

const SCALE: f64 = 0.9;
const FLOOR: f64 = 0.05;
const DECAY: f64 = 100.0;

fn decayed(x: u32) -> f64 {
    SCALE * (-(x as f64) / DECAY).exp() + FLOOR
}

pub fn learning_rate(visit_count: u32) -> f64 {
    decayed(visit_count)
}

pub fn discount(ply_depth: u32) -> f64 {
    decayed(ply_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_schedule_starts_at_upper_bound() {
        assert_approx_eq!(learning_rate(0), 0.95, 1e-12);
        assert_approx_eq!(discount(0), 0.95, 1e-12);
    }

    #[test]
    fn test_schedule_known_values() {
        assert_approx_eq!(learning_rate(1), 0.9 * (-0.01f64).exp() + 0.05, 1e-12);
        assert_approx_eq!(discount(100), 0.9 * (-1.0f64).exp() + 0.05, 1e-12);
    }

    #[test]
    fn test_schedule_stays_within_bounds() {
        for x in [0, 1, 2, 10, 50, 100, 1_000, 10_000, u32::MAX] {
            let lr = learning_rate(x);
            let gamma = discount(x);

            assert!((0.0..=0.95).contains(&lr), "learning rate {} for {}", lr, x);
            assert!((0.0..=0.95).contains(&gamma), "discount {} for {}", gamma, x);
        }
    }

    #[test]
    fn test_schedule_decays_toward_floor() {
        assert!(learning_rate(2) < learning_rate(1));
        assert!(discount(40) < discount(39));
        assert_approx_eq!(learning_rate(100_000), 0.05, 1e-9);
    }
}
