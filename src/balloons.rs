//! Balloon popping mini-game.
//!
//! Fifteen balloons float in the play area. Every pop costs one of four
//! attempts and the fourth pop always reveals the cake, whichever balloon
//! it was. One balloon is flagged special but it only changes the size of
//! its pop burst.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::timeline::Timeline;

pub const TOTAL_BALLOONS: usize = 15;
pub const ATTEMPTS_MAX: u32 = 4;
pub const POP_ANIMATION_MS: u64 = 300;
pub const REVEAL_DELAY_MS: u64 = 1000;
pub const GAME_START_DELAY_MS: u64 = 1000;
pub const POSITION_JITTER_PCT: f64 = 5.0;
pub const AMBIENT_PARTICLES: usize = 20;
pub const COMPACT_MAX_WIDTH: i32 = 768;

pub const BALLOON_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFBE0B", "#FB5607", "#FF85A1", "#FF006E", "#FFC2D1",
    "#77DD77", "#FFD166",
];

const AMBIENT_COLORS: [&str; 5] = ["#FFD700", "#FF1493", "#00CED1", "#FF4500", "#7B68EE"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    /// Narrow viewport or touch input.
    Compact,
}

impl DeviceClass {
    pub fn detect(viewport_width: i32, touch_capable: bool) -> Self {
        if touch_capable || viewport_width <= COMPACT_MAX_WIDTH {
            DeviceClass::Compact
        } else {
            DeviceClass::Desktop
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PlayArea {
    x: (f64, f64),
    y: (f64, f64),
    size_min: u32,
    size_span: u32,
    grid_cols: usize,
    grid_rows: usize,
}

impl PlayArea {
    fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => PlayArea {
                x: (10.0, 70.0),
                y: (10.0, 60.0),
                size_min: 60,
                size_span: 20,
                grid_cols: 5,
                grid_rows: 3,
            },
            DeviceClass::Compact => PlayArea {
                x: (15.0, 65.0),
                y: (15.0, 50.0),
                size_min: 65,
                size_span: 15,
                grid_cols: 3,
                grid_rows: 5,
            },
        }
    }

    fn cell_count(&self) -> usize {
        self.grid_cols * self.grid_rows
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BalloonId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Balloon {
    pub id: BalloonId,
    /// Left edge, percent of the play area width.
    pub x_pct: f64,
    /// Top edge, percent of the play area height.
    pub y_pct: f64,
    pub size_px: u32,
    pub color: &'static str,
    pub is_special: bool,
    pub popped: bool,
}

impl Balloon {
    pub fn height_px(&self) -> f64 {
        self.size_px as f64 * 1.2
    }

    pub fn string_px(&self) -> f64 {
        self.size_px as f64 * 0.5
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientParticle {
    pub x_pct: f64,
    pub y_pct: f64,
    pub size_px: u32,
    pub color: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameAction {
    Burst { id: BalloonId, special: bool },
    /// Pop animation over, drop the balloon node.
    Remove(BalloonId),
    /// Found-the-cake marker plus a confetti launch.
    RevealCake,
    RequestCake,
}

/// A follow-up for the round it was issued in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameCue {
    pub round: u64,
    pub action: GameAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopOutcome {
    Ignored,
    Popped { attempts_used: u32 },
    Completed,
}

#[derive(Debug)]
pub struct Pop {
    pub outcome: PopOutcome,
    pub cues: Timeline<GameCue>,
}

impl Pop {
    fn ignored() -> Self {
        Pop {
            outcome: PopOutcome::Ignored,
            cues: Timeline::new(),
        }
    }
}

#[derive(Debug)]
pub struct BalloonGame {
    balloons: Vec<Balloon>,
    total_balloons: usize,
    attempts_max: u32,
    attempts_used: u32,
    winning: Option<BalloonId>,
    completed: bool,
    round: u64,
}

impl Default for BalloonGame {
    fn default() -> Self {
        Self::new()
    }
}

impl BalloonGame {
    pub fn new() -> Self {
        Self::with_limits(TOTAL_BALLOONS, ATTEMPTS_MAX)
    }

    pub fn with_limits(total_balloons: usize, attempts_max: u32) -> Self {
        BalloonGame {
            balloons: Vec::new(),
            total_balloons,
            attempts_max: attempts_max.max(1),
            attempts_used: 0,
            winning: None,
            completed: false,
            round: 0,
        }
    }

    /// Throws away the previous batch and lays out a fresh one.
    pub fn start_game<R: Rng + ?Sized>(&mut self, device: DeviceClass, rng: &mut R) -> u64 {
        self.round = self.round.wrapping_add(1);
        self.balloons.clear();
        self.attempts_used = 0;
        self.completed = false;

        let area = PlayArea::for_device(device);
        let positions = layout_positions(&area, self.total_balloons, rng);
        for (idx, (x_pct, y_pct)) in positions.into_iter().enumerate() {
            let size_px = area.size_min + rng.random_range(0..area.size_span);
            let color = BALLOON_COLORS[rng.random_range(0..BALLOON_COLORS.len())];
            self.balloons.push(Balloon {
                id: BalloonId(idx as u32),
                x_pct,
                y_pct,
                size_px,
                color,
                is_special: idx + 1 == self.total_balloons,
                popped: false,
            });
        }
        self.winning = self.balloons.last().map(|b| b.id);
        tracing::info!(
            round = self.round,
            balloons = self.balloons.len(),
            ?device,
            "balloon game started"
        );
        self.round
    }

    pub fn pop_balloon(&mut self, id: BalloonId) -> Pop {
        if self.completed || self.attempts_used >= self.attempts_max {
            return Pop::ignored();
        }
        let Some(balloon) = self.balloons.iter_mut().find(|b| b.id == id) else {
            return Pop::ignored();
        };
        if balloon.popped {
            return Pop::ignored();
        }

        balloon.popped = true;
        let special = balloon.is_special;
        self.attempts_used += 1;
        let round = self.round;
        let cue = |action| GameCue { round, action };

        let mut cues = Timeline::new()
            .at(0, cue(GameAction::Burst { id, special }))
            .at(POP_ANIMATION_MS, cue(GameAction::Remove(id)));

        let outcome = if self.attempts_used == self.attempts_max {
            self.completed = true;
            cues = cues.at(0, cue(GameAction::RevealCake)).at(
                POP_ANIMATION_MS + REVEAL_DELAY_MS,
                cue(GameAction::RequestCake),
            );
            tracing::info!(round, special, "final attempt used, revealing cake");
            PopOutcome::Completed
        } else {
            tracing::debug!(round, attempts = self.attempts_used, special, "balloon popped");
            PopOutcome::Popped {
                attempts_used: self.attempts_used,
            }
        };

        Pop { outcome, cues }
    }

    /// Drops the record of a popped balloon once its animation is over.
    pub fn remove_balloon(&mut self, id: BalloonId) -> bool {
        let before = self.balloons.len();
        self.balloons.retain(|b| !(b.id == id && b.popped));
        self.balloons.len() != before
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn attempts_max(&self) -> u32 {
        self.attempts_max
    }

    pub fn counter_label(&self) -> String {
        format!("{}/{}", self.attempts_used, self.attempts_max)
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn balloon(&self, id: BalloonId) -> Option<&Balloon> {
        self.balloons.iter().find(|b| b.id == id)
    }

    pub fn winning_balloon(&self) -> Option<BalloonId> {
        self.winning
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Cues from an older round must be dropped.
    pub fn is_current(&self, cue: &GameCue) -> bool {
        cue.round == self.round
    }
}

/// One balloon per shuffled grid cell with a little jitter; whatever does
/// not fit in the grid is placed anywhere in the area.
fn layout_positions<R: Rng + ?Sized>(area: &PlayArea, count: usize, rng: &mut R) -> Vec<(f64, f64)> {
    let mut cells: Vec<usize> = (0..area.cell_count()).collect();
    cells.shuffle(rng);

    let cell_w = (area.x.1 - area.x.0) / area.grid_cols as f64;
    let cell_h = (area.y.1 - area.y.0) / area.grid_rows as f64;

    (0..count)
        .map(|i| match cells.get(i) {
            Some(&cell) => {
                let col = (cell % area.grid_cols) as f64;
                let row = (cell / area.grid_cols) as f64;
                let jitter_x = rng.random_range(-POSITION_JITTER_PCT..=POSITION_JITTER_PCT);
                let jitter_y = rng.random_range(-POSITION_JITTER_PCT..=POSITION_JITTER_PCT);
                let x = area.x.0 + (col + 0.5) * cell_w + jitter_x;
                let y = area.y.0 + (row + 0.5) * cell_h + jitter_y;
                (x.clamp(area.x.0, area.x.1), y.clamp(area.y.0, area.y.1))
            }
            None => (
                rng.random_range(area.x.0..area.x.1),
                rng.random_range(area.y.0..area.y.1),
            ),
        })
        .collect()
}

pub fn ambient_particles<R: Rng + ?Sized>(rng: &mut R) -> Vec<AmbientParticle> {
    (0..AMBIENT_PARTICLES)
        .map(|_| AmbientParticle {
            x_pct: rng.random_range(0.0..100.0),
            y_pct: rng.random_range(0.0..100.0),
            size_px: rng.random_range(3..9),
            color: AMBIENT_COLORS[rng.random_range(0..AMBIENT_COLORS.len())],
        })
        .collect()
}
