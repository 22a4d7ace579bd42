use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use birthday_surprise::balloons::{BalloonGame, DeviceClass, GameAction, PopOutcome};
use birthday_surprise::card::{CardCue, GreetingCard};
use birthday_surprise::gallery::{Gallery, GalleryCue, GalleryView, ScrollMetrics, ScrollSource};
use birthday_surprise::sections::{Section, SectionController, SectionCue};
use birthday_surprise::timeline::Timeline;

/// Pending events keyed by absolute time, drained in order.
struct Clock<E> {
    now: Duration,
    queue: BTreeMap<(Duration, u64), E>,
    seq: u64,
}

impl<E> Clock<E> {
    fn new() -> Self {
        Clock {
            now: Duration::ZERO,
            queue: BTreeMap::new(),
            seq: 0,
        }
    }

    fn schedule(&mut self, timeline: Timeline<E>) {
        for cue in timeline {
            self.seq += 1;
            self.queue.insert((self.now + cue.at, self.seq), cue.event);
        }
    }

    fn next(&mut self) -> Option<E> {
        let ((at, _), event) = self.queue.pop_first()?;
        self.now = at;
        Some(event)
    }
}

enum Event {
    Game(GameAction),
    Section(SectionCue),
}

#[test]
fn scenario_a_four_pops_reveal_the_cake() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut sections = SectionController::new();
    assert!(sections.jump(Section::Intro, Section::Main));
    let to_game = sections.switch_section(Some(Section::Main), Section::Game).unwrap();
    assert!(to_game.events().any(|c| *c == SectionCue::Settled(Section::Game)));

    let mut clock = Clock::new();
    clock.schedule(to_game.map(Event::Section));

    let mut game = BalloonGame::new();
    game.start_game(DeviceClass::Desktop, &mut rng);
    let ids: Vec<_> = game.balloons().iter().map(|b| b.id).take(4).collect();

    let mut outcomes = Vec::new();
    for id in ids {
        let pop = game.pop_balloon(id);
        outcomes.push(pop.outcome);
        clock.schedule(pop.cues.map(|cue| Event::Game(cue.action)));
    }
    assert_eq!(
        outcomes,
        vec![
            PopOutcome::Popped { attempts_used: 1 },
            PopOutcome::Popped { attempts_used: 2 },
            PopOutcome::Popped { attempts_used: 3 },
            PopOutcome::Completed,
        ]
    );
    assert_eq!(game.counter_label(), "4/4");
    assert!(game.is_complete());

    let mut celebrations = 0;
    let mut cake_requests = 0;
    while let Some(event) = clock.next() {
        match event {
            Event::Game(GameAction::Remove(id)) => assert!(game.remove_balloon(id)),
            Event::Game(GameAction::RequestCake) => {
                cake_requests += 1;
                // A second completion path racing the first must be harmless.
                for _ in 0..2 {
                    if let Some(timeline) = sections.switch_section(Some(Section::Game), Section::Cake) {
                        clock.schedule(timeline.map(Event::Section));
                    }
                }
            }
            Event::Game(_) => {}
            Event::Section(SectionCue::Retire(section)) => {
                sections.retire(section);
            }
            Event::Section(SectionCue::Settled(section)) => {
                if sections.finish_fade_in(section) {
                    celebrations += 1;
                }
            }
            Event::Section(_) => {}
        }
    }

    assert_eq!(cake_requests, 1);
    assert_eq!(celebrations, 1);
    assert_eq!(sections.active(), Some(Section::Cake));
    assert_eq!(sections.present(), vec![Section::Cake]);
    assert!(sections.cake_celebrated());
    assert_eq!(game.balloons().len(), 11);
}

#[test]
fn scenario_b_gallery_continue_is_terminal() {
    let mut gallery = Gallery::new(6);
    let mut clock = Clock::new();
    assert!(gallery.request_open());
    assert_eq!(gallery.view(), GalleryView::Horizontal);

    // A burst of scroll notifications; only the last one settles.
    let early = gallery.note_scroll(ScrollSource::Strip).unwrap();
    let late = gallery.note_scroll(ScrollSource::Strip).unwrap();
    let at_end = ScrollMetrics {
        offset: 1560.0,
        content_len: 2000.0,
        viewport_len: 400.0,
    };
    assert!(gallery.settle_scroll(early, ScrollSource::Strip, at_end).is_none());
    let grid = gallery.settle_scroll(late, ScrollSource::Strip, at_end).unwrap();
    assert_eq!(gallery.view(), GalleryView::Grid);
    assert!(grid.events().any(|c| *c == GalleryCue::ShowContinue));
    clock.schedule(grid);
    while clock.next().is_some() {}

    let navigation = gallery.navigate_to_card().unwrap();
    assert!(gallery.has_navigated_to_card());
    assert_eq!(gallery.view(), GalleryView::Closed);
    assert!(gallery.navigate_to_card().is_none());
    clock.schedule(navigation);

    let mut detach = false;
    while let Some(cue) = clock.next() {
        if cue == GalleryCue::NavigationSettled {
            detach = gallery.finish_navigation();
        }
    }
    assert!(detach);
    assert!(!gallery.is_navigating());

    assert!(!gallery.request_open());
    assert_eq!(gallery.view(), GalleryView::Closed);
    // Card clicks come and go without reviving the gallery.
    let lock = gallery.card_clicked();
    clock.schedule(lock);
    while let Some(cue) = clock.next() {
        if cue == GalleryCue::ReleaseLock {
            gallery.release_lock();
        }
    }
    assert!(!gallery.request_open());
    assert!(!gallery.open_enabled());
}

#[test]
fn scenario_c_rapid_card_clicks_open_once() {
    let mut card = GreetingCard::new();
    let first = card.toggle(DeviceClass::Desktop).unwrap();
    assert!(first.opening);
    assert!(card.is_animating());
    assert!(card.toggle(DeviceClass::Desktop).is_none());
    assert!(card.is_open());

    let mut clock = Clock::new();
    clock.schedule(first.cues);
    while let Some(cue) = clock.next() {
        if cue == CardCue::Settle {
            card.settle();
        }
    }
    assert!(card.is_open());
    assert!(!card.is_animating());
}

#[test]
fn random_pop_sequences_never_exceed_attempts() {
    let mut rng = StdRng::seed_from_u64(99);
    for round in 0..50 {
        let mut game = BalloonGame::new();
        let device = if round % 2 == 0 {
            DeviceClass::Desktop
        } else {
            DeviceClass::Compact
        };
        game.start_game(device, &mut rng);
        let ids: Vec<_> = game.balloons().iter().map(|b| b.id).collect();

        let mut completions = 0;
        for _ in 0..rng.random_range(0..30) {
            let id = ids[rng.random_range(0..ids.len())];
            let before = game.attempts_used();
            let pop = game.pop_balloon(id);
            if before == game.attempts_max() {
                assert_eq!(pop.outcome, PopOutcome::Ignored);
            }
            if pop.outcome == PopOutcome::Completed {
                completions += 1;
                assert_eq!(game.attempts_used(), game.attempts_max());
            }
            assert!(game.attempts_used() <= game.attempts_max());
        }
        assert!(completions <= 1);
        assert_eq!(completions == 1, game.is_complete());
    }
}
