use crate::constants::FIXED_EASE_RATIO;
use glam::Vec3;

/// How trailing points ease toward their predecessor each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrailPolicy {
    /// Full propagation takes `max_age` milliseconds of wall-clock time,
    /// independent of frame rate.
    TimeBased {
        segment_delay_ms: f32,
        speed_multiplier: f32,
    },
    /// Constant per-tick ratio; frame-rate dependent.
    FixedRatio(f32),
}

impl TrailPolicy {
    pub fn from_max_age(max_age_ms: f32, point_count: usize, speed_multiplier: f32) -> Self {
        if max_age_ms.is_finite() && max_age_ms > 0.0 && point_count > 1 {
            TrailPolicy::TimeBased {
                segment_delay_ms: max_age_ms / (point_count - 1) as f32,
                speed_multiplier,
            }
        } else {
            TrailPolicy::FixedRatio(FIXED_EASE_RATIO)
        }
    }

    /// Interpolation factor for one tick of `dt_ms`, in [0, 1].
    #[inline]
    pub fn alpha(&self, dt_ms: f32) -> f32 {
        match *self {
            TrailPolicy::TimeBased {
                segment_delay_ms,
                speed_multiplier,
            } => (dt_ms * speed_multiplier / segment_delay_ms).clamp(0.0, 1.0),
            TrailPolicy::FixedRatio(ratio) => ratio,
        }
    }
}

/// Ease points `1..` toward their predecessor, head to tail.
///
/// Each point reads the predecessor already moved in this pass, so a head
/// displacement cascades down the chain within a single tick.
pub fn propagate(points: &mut [Vec3], dt_ms: f32, policy: TrailPolicy) {
    let alpha = policy.alpha(dt_ms);
    for i in 1..points.len() {
        let lead = points[i - 1];
        points[i] = points[i].lerp(lead, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_based(max_age: f32, n: usize) -> TrailPolicy {
        TrailPolicy::from_max_age(max_age, n, 1.0)
    }

    #[test]
    fn zero_or_infinite_max_age_selects_fixed_ratio() {
        assert_eq!(
            TrailPolicy::from_max_age(0.0, 10, 0.6),
            TrailPolicy::FixedRatio(0.9)
        );
        assert_eq!(
            TrailPolicy::from_max_age(f32::INFINITY, 10, 0.6),
            TrailPolicy::FixedRatio(0.9)
        );
        assert_eq!(
            TrailPolicy::from_max_age(-5.0, 10, 0.6),
            TrailPolicy::FixedRatio(0.9)
        );
    }

    #[test]
    fn segment_delay_splits_max_age() {
        match TrailPolicy::from_max_age(500.0, 51, 0.6) {
            TrailPolicy::TimeBased {
                segment_delay_ms,
                speed_multiplier,
            } => {
                assert!((segment_delay_ms - 10.0).abs() < 1e-6);
                assert!((speed_multiplier - 0.6).abs() < 1e-6);
            }
            other => panic!("unexpected policy {other:?}"),
        }
    }

    #[test]
    fn alpha_clamps() {
        let p = time_based(100.0, 11); // 10ms per segment
        assert_eq!(p.alpha(0.0), 0.0);
        assert!((p.alpha(5.0) - 0.5).abs() < 1e-6);
        assert_eq!(p.alpha(1000.0), 1.0);
        assert_eq!(p.alpha(-3.0), 0.0);
    }

    #[test]
    fn zero_dt_moves_nothing() {
        let mut pts = vec![Vec3::X, Vec3::ZERO, Vec3::Y];
        let before = pts.clone();
        propagate(&mut pts, 0.0, time_based(500.0, 3));
        assert_eq!(pts, before);
    }

    #[test]
    fn dt_at_max_age_snaps_whole_chain() {
        let mut pts = vec![Vec3::new(2.0, 1.0, 0.0), Vec3::ZERO, Vec3::NEG_X, Vec3::Y];
        propagate(&mut pts, 500.0, time_based(500.0, 4));
        for p in &pts {
            assert_eq!(*p, Vec3::new(2.0, 1.0, 0.0));
        }
    }

    #[test]
    fn perturbation_cascades_in_one_pass() {
        let mut pts = vec![Vec3::ZERO; 4];
        pts[0] = Vec3::X;
        propagate(&mut pts, 0.0, TrailPolicy::FixedRatio(0.5));
        assert!((pts[1].x - 0.5).abs() < 1e-6);
        assert!((pts[2].x - 0.25).abs() < 1e-6);
        assert!((pts[3].x - 0.125).abs() < 1e-6);
    }
}
