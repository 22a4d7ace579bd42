//! Flip-open greeting card.

use crate::balloons::DeviceClass;
use crate::timeline::Timeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipTimings {
    /// When the inner face is raised above the front.
    pub swap_ms: u64,
    /// Full length of the flip transition.
    pub full_ms: u64,
}

impl FlipTimings {
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => FlipTimings {
                swap_ms: 400,
                full_ms: 800,
            },
            DeviceClass::Compact => FlipTimings {
                swap_ms: 300,
                full_ms: 600,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardCue {
    ShowInner,
    RaiseInner,
    HideFront,
    ShowFront,
    LowerInner,
    /// Hide the inner face, unless the card was reopened meanwhile.
    HideInner,
    Settle,
}

#[derive(Debug)]
pub struct Flip {
    pub opening: bool,
    /// The card always throws confetti when it moves.
    pub celebrate: bool,
    pub cues: Timeline<CardCue>,
}

#[derive(Debug, Default)]
pub struct GreetingCard {
    open: bool,
    animating: bool,
}

impl GreetingCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Flips the card. Ignored while a flip is still running.
    pub fn toggle(&mut self, device: DeviceClass) -> Option<Flip> {
        if self.animating {
            tracing::debug!("card flip ignored: still animating");
            return None;
        }
        self.animating = true;
        self.open = !self.open;
        let timings = FlipTimings::for_device(device);

        let cues = if self.open {
            Timeline::new()
                .at(0, CardCue::ShowInner)
                .at(timings.swap_ms, CardCue::RaiseInner)
                .at(timings.swap_ms, CardCue::HideFront)
                .at(timings.full_ms, CardCue::Settle)
        } else {
            Timeline::new()
                .at(0, CardCue::ShowFront)
                .at(0, CardCue::LowerInner)
                .at(timings.full_ms, CardCue::HideInner)
                .at(timings.full_ms, CardCue::Settle)
        };
        tracing::debug!(open = self.open, ?device, "card flipping");
        Some(Flip {
            opening: self.open,
            celebrate: true,
            cues,
        })
    }

    /// Clicking the card body only ever opens it.
    pub fn open_from_card(&mut self, device: DeviceClass) -> Option<Flip> {
        if self.open {
            return None;
        }
        self.toggle(device)
    }

    /// Whether a `HideInner` cue still applies.
    pub fn should_hide_inner(&self) -> bool {
        !self.open
    }

    pub fn settle(&mut self) {
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(flip: &Flip, cue: CardCue) -> usize {
        flip.cues.events().position(|c| *c == cue).unwrap()
    }

    #[test]
    fn toggle_inside_window_changes_state_once() {
        let mut card = GreetingCard::new();
        assert!(card.toggle(DeviceClass::Desktop).is_some());
        assert!(card.toggle(DeviceClass::Desktop).is_none());
        assert!(card.is_open());
    }

    #[test]
    fn toggle_outside_window_round_trips() {
        let mut card = GreetingCard::new();
        card.toggle(DeviceClass::Desktop).unwrap();
        card.settle();
        card.toggle(DeviceClass::Desktop).unwrap();
        card.settle();
        assert!(!card.is_open());
        assert!(!card.is_animating());
    }

    #[test]
    fn opening_swaps_before_hiding_front() {
        let mut card = GreetingCard::new();
        let flip = card.toggle(DeviceClass::Desktop).unwrap();
        assert!(flip.opening);
        assert!(flip.celebrate);
        assert!(position(&flip, CardCue::ShowInner) < position(&flip, CardCue::RaiseInner));
        assert!(position(&flip, CardCue::RaiseInner) < position(&flip, CardCue::HideFront));
        assert_eq!(flip.cues.span().as_millis(), 800);
    }

    #[test]
    fn closing_lowers_after_front_is_visible() {
        let mut card = GreetingCard::new();
        card.toggle(DeviceClass::Compact).unwrap();
        card.settle();
        let flip = card.toggle(DeviceClass::Compact).unwrap();
        assert!(!flip.opening);
        assert!(position(&flip, CardCue::ShowFront) < position(&flip, CardCue::LowerInner));
        assert!(position(&flip, CardCue::LowerInner) < position(&flip, CardCue::HideInner));
        assert_eq!(flip.cues.span().as_millis(), 600);
        assert!(card.should_hide_inner());
    }

    #[test]
    fn compact_timings_are_shorter() {
        let desktop = FlipTimings::for_device(DeviceClass::Desktop);
        let compact = FlipTimings::for_device(DeviceClass::Compact);
        assert!(compact.full_ms < desktop.full_ms);
        assert!(compact.swap_ms < compact.full_ms);
    }

    #[test]
    fn card_body_only_opens() {
        let mut card = GreetingCard::new();
        assert!(card.open_from_card(DeviceClass::Desktop).is_some());
        card.settle();
        assert!(card.open_from_card(DeviceClass::Desktop).is_none());
        assert!(card.is_open());
    }
}
