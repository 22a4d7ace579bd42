//! Confetti presets and the fire-and-forget burst interface.

use crate::timeline::Timeline;

pub const CONFETTI_COLORS: [&str; 5] = ["#ffb6c1", "#ffd700", "#9370db", "#ff69b4", "#00bfff"];
pub const TRAIL_COLORS: [&str; 5] = ["#FFB6C1", "#FFC0CB", "#FF69B4", "#FF1493", "#DB7093"];
pub const SPECIAL_POP_COLOR: &str = "#FFD700";
/// Side streams keep firing for this long after a launch.
pub const STREAM_MS: u64 = 5000;
pub const STREAM_INTERVAL_MS: u64 = 250;

#[derive(Clone, Debug, PartialEq)]
pub struct BurstConfig {
    pub particles: u32,
    pub spread_deg: f64,
    /// Launch angle in degrees, 90 is straight up.
    pub angle_deg: f64,
    /// Origin as fractions of the surface.
    pub origin: (f64, f64),
    pub colors: Vec<&'static str>,
    pub scale: f64,
}

impl BurstConfig {
    fn centered(particles: u32, spread_deg: f64, origin_y: f64) -> Self {
        BurstConfig {
            particles,
            spread_deg,
            angle_deg: 90.0,
            origin: (0.5, origin_y),
            colors: CONFETTI_COLORS.to_vec(),
            scale: 1.0,
        }
    }

    pub fn cake_opening() -> Self {
        Self::centered(150, 100.0, 0.6)
    }

    pub fn pop(origin: (f64, f64), color: &'static str, special: bool) -> Self {
        BurstConfig {
            particles: if special { 30 } else { 15 },
            spread_deg: 360.0,
            angle_deg: 90.0,
            origin,
            colors: vec![if special { SPECIAL_POP_COLOR } else { color }],
            scale: 0.8,
        }
    }

    pub fn trail(origin: (f64, f64)) -> Self {
        BurstConfig {
            particles: 3,
            spread_deg: 50.0,
            angle_deg: 90.0,
            origin,
            colors: TRAIL_COLORS.to_vec(),
            scale: 0.7,
        }
    }

    fn side_stream(left: bool) -> Self {
        BurstConfig {
            particles: 2,
            spread_deg: 55.0,
            angle_deg: if left { 60.0 } else { 120.0 },
            origin: (if left { 0.0 } else { 1.0 }, 0.65),
            colors: CONFETTI_COLORS.to_vec(),
            scale: 1.0,
        }
    }
}

/// Full confetti launch: a big burst, a smaller one a second later and
/// short side streams for a few seconds.
pub fn confetti_launch() -> Timeline<BurstConfig> {
    let mut timeline = Timeline::new()
        .at(0, BurstConfig::centered(100, 100.0, 0.6))
        .at(1000, BurstConfig::centered(50, 120.0, 0.5));
    let mut at = 0;
    while at < STREAM_MS {
        timeline = timeline
            .at(at, BurstConfig::side_stream(true))
            .at(at, BurstConfig::side_stream(false));
        at += STREAM_INTERVAL_MS;
    }
    timeline
}

/// Something that can draw a particle burst.
pub trait Celebration {
    fn burst(&self, config: &BurstConfig);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_pop_is_bigger_and_golden() {
        let normal = BurstConfig::pop((0.5, 0.5), "#FF6B6B", false);
        let special = BurstConfig::pop((0.5, 0.5), "#FF6B6B", true);
        assert_eq!(normal.particles, 15);
        assert_eq!(special.particles, 30);
        assert_eq!(special.colors, vec![SPECIAL_POP_COLOR]);
    }

    #[test]
    fn launch_has_two_bursts_and_streams() {
        let launch = confetti_launch();
        let big: Vec<_> = launch.events().filter(|b| b.particles >= 50).collect();
        assert_eq!(big.len(), 2);
        assert!(launch.span().as_millis() < STREAM_MS as u128);
        assert!(launch.events().any(|b| b.angle_deg == 60.0));
        assert!(launch.events().any(|b| b.angle_deg == 120.0));
    }
}
