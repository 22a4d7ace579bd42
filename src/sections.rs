//! Which top-level view is on screen and how we move between them.

use std::time::{Duration, Instant};

use crate::balloons::GAME_START_DELAY_MS;
use crate::timeline::Timeline;

pub const FADE_OUT_MS: u64 = 400;
pub const SERIALIZE_DELAY_MS: u64 = 300;
pub const FADE_IN_MS: u64 = 400;
pub const TRAIL_INTERVAL_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Intro,
    Main,
    Game,
    Cake,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Intro, Section::Main, Section::Game, Section::Cake];

    pub fn name(self) -> &'static str {
        match self {
            Section::Intro => "intro",
            Section::Main => "main",
            Section::Game => "game",
            Section::Cake => "cake",
        }
    }

    fn slot(self) -> usize {
        match self {
            Section::Intro => 0,
            Section::Main => 1,
            Section::Game => 2,
            Section::Cake => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionCue {
    /// Present the incoming section at zero opacity.
    Reveal(Section),
    FadeOut(Section),
    FadeIn(Section),
    /// Outgoing fade finished: hide it and reset its opacity.
    Retire(Section),
    /// Incoming fade finished.
    Settled(Section),
    /// First balloon round is due, counted from the switch request.
    StartGame,
}

#[derive(Debug)]
pub struct SectionController {
    active: Option<Section>,
    mounted: [bool; 4],
    present: [bool; 4],
    cake_requested: bool,
    cake_celebrated: bool,
}

impl Default for SectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionController {
    /// All four sections mounted, intro showing.
    pub fn new() -> Self {
        let mut present = [false; 4];
        present[Section::Intro.slot()] = true;
        SectionController {
            active: Some(Section::Intro),
            mounted: [true; 4],
            present,
            cake_requested: false,
            cake_celebrated: false,
        }
    }

    pub fn mount(&mut self, section: Section) {
        self.mounted[section.slot()] = true;
    }

    pub fn unmount(&mut self, section: Section) {
        self.mounted[section.slot()] = false;
    }

    pub fn is_mounted(&self, section: Section) -> bool {
        self.mounted[section.slot()]
    }

    pub fn active(&self) -> Option<Section> {
        self.active
    }

    pub fn is_active(&self, section: Section) -> bool {
        self.active == Some(section)
    }

    /// Sections currently rendered, including the one fading out.
    pub fn present(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.present[s.slot()])
            .collect()
    }

    pub fn cake_celebrated(&self) -> bool {
        self.cake_celebrated
    }

    fn accepts(&self, from: Option<Section>, to: Section) -> bool {
        if !self.is_mounted(to) || from.is_some_and(|f| !self.is_mounted(f)) {
            tracing::debug!(to = to.name(), "section switch ignored: target not mounted");
            return false;
        }
        if self.active == Some(to) {
            return false;
        }
        if from.is_none() && self.active.is_some() {
            tracing::debug!(
                active = self.active.map(Section::name),
                "section switch ignored: no source given while a section is active"
            );
            return false;
        }
        if from.is_some() && from != self.active {
            tracing::debug!(
                from = from.map(Section::name),
                active = self.active.map(Section::name),
                "section switch ignored: source is not active"
            );
            return false;
        }
        if to == Section::Cake && (self.cake_requested || self.cake_celebrated) {
            tracing::debug!("cake already requested, ignoring repeated switch");
            return false;
        }
        true
    }

    /// Fades `from` out and `to` in. Returns `None` when the request is
    /// ignored (unmounted target, already active, repeated cake request).
    /// `from` may only be `None` for the very first activation.
    pub fn switch_section(
        &mut self,
        from: Option<Section>,
        to: Section,
    ) -> Option<Timeline<SectionCue>> {
        if !self.accepts(from, to) {
            return None;
        }
        tracing::debug!(from = from.map(Section::name), to = to.name(), "switching section");
        self.active = Some(to);
        self.present[to.slot()] = true;
        if to == Section::Cake {
            self.cake_requested = true;
        }

        let mut timeline = Timeline::new().at(0, SectionCue::Reveal(to));
        if let Some(from) = from {
            timeline = timeline
                .at(0, SectionCue::FadeOut(from))
                .at(FADE_OUT_MS, SectionCue::Retire(from));
        }
        timeline = timeline
            .at(SERIALIZE_DELAY_MS, SectionCue::FadeIn(to))
            .at(SERIALIZE_DELAY_MS + FADE_IN_MS, SectionCue::Settled(to));
        if to == Section::Game {
            timeline = timeline.at(GAME_START_DELAY_MS, SectionCue::StartGame);
        }
        Some(timeline)
    }

    /// Instant switch used by the intro's start button.
    pub fn jump(&mut self, from: Section, to: Section) -> bool {
        if !self.accepts(Some(from), to) {
            return false;
        }
        self.active = Some(to);
        self.present[from.slot()] = false;
        self.present[to.slot()] = true;
        if to == Section::Cake {
            self.cake_requested = true;
        }
        true
    }

    /// Handles a `Retire` cue. Returns false if the section became active
    /// again in the meantime and must stay on screen.
    pub fn retire(&mut self, section: Section) -> bool {
        if self.active == Some(section) {
            return false;
        }
        self.present[section.slot()] = false;
        true
    }

    /// Handles a `Settled` cue. Returns true exactly once, when the cake
    /// finishes fading in and should be celebrated.
    pub fn finish_fade_in(&mut self, section: Section) -> bool {
        if section != Section::Cake || self.active != Some(Section::Cake) || self.cake_celebrated {
            return false;
        }
        self.cake_celebrated = true;
        tracing::info!("cake revealed, celebrating");
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CakeLayer {
    Bottom,
    Middle,
    Top,
    Candle,
    Flame,
}

impl CakeLayer {
    pub fn css_class(self) -> &'static str {
        match self {
            CakeLayer::Bottom => "cake-bottom",
            CakeLayer::Middle => "cake-middle",
            CakeLayer::Top => "cake-top",
            CakeLayer::Candle => "candle",
            CakeLayer::Flame => "flame",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CakeCue {
    ShowMessage,
    Layer { layer: CakeLayer, duration_ms: u64 },
    Sparkles,
    /// Long confetti launch and the wishes text.
    Finale,
}

const CAKE_START_DELAY_MS: u64 = 800;
const CAKE_LAYER_MS: u64 = 800;
const CAKE_LAYER_OVERLAP_MS: u64 = 300;
const FLAME_MS: u64 = 500;

/// Layered build-up played once the cake has been celebrated.
pub fn cake_buildup() -> Timeline<CakeCue> {
    let mut timeline = Timeline::new().at(0, CakeCue::ShowMessage);
    let mut start = CAKE_START_DELAY_MS;
    for layer in [CakeLayer::Bottom, CakeLayer::Middle, CakeLayer::Top, CakeLayer::Candle] {
        timeline = timeline.at(
            start,
            CakeCue::Layer {
                layer,
                duration_ms: CAKE_LAYER_MS,
            },
        );
        start += CAKE_LAYER_MS - CAKE_LAYER_OVERLAP_MS;
    }
    // The flame waits for the candle to land.
    let flame_start = start - (CAKE_LAYER_MS - CAKE_LAYER_OVERLAP_MS) + CAKE_LAYER_MS;
    let flame_end = flame_start + FLAME_MS;
    timeline
        .at(
            flame_start,
            CakeCue::Layer {
                layer: CakeLayer::Flame,
                duration_ms: FLAME_MS,
            },
        )
        .at(flame_end, CakeCue::Sparkles)
        .at(flame_end, CakeCue::Finale)
}

/// Rate limiter for the pointer confetti trail.
#[derive(Debug)]
pub struct TrailThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl Default for TrailThrottle {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(TRAIL_INTERVAL_MS),
            last: None,
        }
    }
}

impl TrailThrottle {
    pub fn should_emit(&mut self, now: Instant, active: Option<Section>) -> bool {
        if !matches!(active, Some(Section::Main | Section::Cake)) {
            return false;
        }
        if let Some(last) = self.last
            && now.saturating_duration_since(last) <= self.interval
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_at(section: Section) -> SectionController {
        let mut ctl = SectionController::new();
        match section {
            Section::Intro => {}
            Section::Main => assert!(ctl.jump(Section::Intro, Section::Main)),
            Section::Game => {
                assert!(ctl.jump(Section::Intro, Section::Main));
                assert!(ctl.switch_section(Some(Section::Main), Section::Game).is_some());
            }
            Section::Cake => unreachable!(),
        }
        ctl
    }

    #[test]
    fn starts_on_intro() {
        let ctl = SectionController::new();
        assert_eq!(ctl.active(), Some(Section::Intro));
        assert_eq!(ctl.present(), vec![Section::Intro]);
    }

    #[test]
    fn switch_fades_out_then_in_with_gap() {
        let mut ctl = controller_at(Section::Main);
        let timeline = ctl
            .switch_section(Some(Section::Main), Section::Game)
            .expect("switch accepted");
        let fade_in = timeline
            .offset_of(|c| *c == SectionCue::FadeIn(Section::Game))
            .unwrap();
        let fade_out = timeline
            .offset_of(|c| *c == SectionCue::FadeOut(Section::Main))
            .unwrap();
        assert!(fade_in > fade_out);
        assert_eq!(fade_in, Duration::from_millis(SERIALIZE_DELAY_MS));
        assert_eq!(
            timeline.offset_of(|c| *c == SectionCue::Settled(Section::Game)),
            Some(Duration::from_millis(SERIALIZE_DELAY_MS + FADE_IN_MS))
        );
        assert_eq!(ctl.active(), Some(Section::Game));
    }

    #[test]
    fn game_start_counts_from_the_request() {
        let mut ctl = controller_at(Section::Main);
        let timeline = ctl
            .switch_section(Some(Section::Main), Section::Game)
            .unwrap();
        assert_eq!(
            timeline.offset_of(|c| *c == SectionCue::StartGame),
            Some(Duration::from_millis(GAME_START_DELAY_MS))
        );
        assert_eq!(timeline.span(), Duration::from_millis(GAME_START_DELAY_MS));

        let to_cake = ctl
            .switch_section(Some(Section::Game), Section::Cake)
            .unwrap();
        assert!(!to_cake.events().any(|c| *c == SectionCue::StartGame));
    }

    #[test]
    fn both_sections_present_during_fade() {
        let mut ctl = controller_at(Section::Main);
        ctl.switch_section(Some(Section::Main), Section::Game).unwrap();
        assert_eq!(ctl.present(), vec![Section::Main, Section::Game]);
        assert!(ctl.retire(Section::Main));
        assert_eq!(ctl.present(), vec![Section::Game]);
    }

    #[test]
    fn switching_to_active_section_is_ignored() {
        let mut ctl = controller_at(Section::Main);
        assert!(ctl.switch_section(Some(Section::Intro), Section::Main).is_none());
        assert!(ctl.switch_section(None, Section::Main).is_none());
    }

    #[test]
    fn source_must_be_active() {
        let mut ctl = controller_at(Section::Main);
        assert!(ctl.switch_section(Some(Section::Game), Section::Cake).is_none());
        assert_eq!(ctl.active(), Some(Section::Main));
    }

    #[test]
    fn sourceless_switch_needs_an_empty_stage() {
        let mut ctl = controller_at(Section::Main);
        assert!(ctl.switch_section(None, Section::Game).is_none());
        assert_eq!(ctl.active(), Some(Section::Main));
        assert_eq!(ctl.present(), vec![Section::Main]);

        let timeline = ctl
            .switch_section(Some(Section::Main), Section::Game)
            .unwrap();
        for cue in timeline.events() {
            if let SectionCue::Retire(section) = cue {
                ctl.retire(*section);
            }
        }
        assert_eq!(ctl.present(), vec![Section::Game]);
    }

    #[test]
    fn unmounted_sections_degrade_to_noop() {
        let mut ctl = controller_at(Section::Main);
        ctl.unmount(Section::Game);
        assert!(ctl.switch_section(Some(Section::Main), Section::Game).is_none());
        assert_eq!(ctl.active(), Some(Section::Main));
    }

    #[test]
    fn cake_transition_is_idempotent() {
        let mut ctl = controller_at(Section::Game);
        let first = ctl.switch_section(Some(Section::Game), Section::Cake);
        let second = ctl.switch_section(Some(Section::Game), Section::Cake);
        assert!(first.is_some());
        assert!(second.is_none());

        let celebrations = [ctl.finish_fade_in(Section::Cake), ctl.finish_fade_in(Section::Cake)]
            .into_iter()
            .filter(|c| *c)
            .count();
        assert_eq!(celebrations, 1);
        assert!(ctl.cake_celebrated());
    }

    #[test]
    fn retire_keeps_reactivated_section() {
        let mut ctl = controller_at(Section::Game);
        assert!(!ctl.retire(Section::Game));
        assert!(ctl.present().contains(&Section::Game));
    }

    #[test]
    fn cake_buildup_runs_bottom_to_flame() {
        let timeline = cake_buildup();
        let layers: Vec<_> = timeline
            .events()
            .filter_map(|c| match c {
                CakeCue::Layer { layer, .. } => Some(*layer),
                _ => None,
            })
            .collect();
        assert_eq!(
            layers,
            vec![
                CakeLayer::Bottom,
                CakeLayer::Middle,
                CakeLayer::Top,
                CakeLayer::Candle,
                CakeLayer::Flame
            ]
        );
        let flame = timeline
            .offset_of(|c| matches!(c, CakeCue::Layer { layer: CakeLayer::Flame, .. }))
            .unwrap();
        assert_eq!(flame, Duration::from_millis(3100));
        assert_eq!(timeline.span(), Duration::from_millis(3600));
    }

    #[test]
    fn trail_only_in_main_and_cake_and_throttled() {
        let mut throttle = TrailThrottle::default();
        let t0 = Instant::now();
        assert!(!throttle.should_emit(t0, Some(Section::Game)));
        assert!(throttle.should_emit(t0, Some(Section::Main)));
        assert!(!throttle.should_emit(t0 + Duration::from_millis(150), Some(Section::Main)));
        assert!(throttle.should_emit(t0 + Duration::from_millis(250), Some(Section::Cake)));
    }
}
