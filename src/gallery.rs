//! Photo gallery view state.
//!
//! The gallery opens as a horizontal strip, turns into a grid once the user
//! scrolls near the end, and closes for good when the user continues to the
//! greeting card. After that point nothing can open it again.

use crate::timeline::Timeline;

pub const SCROLL_DEBOUNCE_MS: u64 = 100;
pub const CARD_LOCK_MS: u64 = 800;
pub const GRID_HANDOFF_MS: u64 = 400;
pub const GRID_REVEAL_DELAY_MS: u64 = 100;
pub const GRID_STAGGER_MS: u64 = 60;
pub const HORIZONTAL_RETURN_MS: u64 = 300;
pub const OVERLAY_FADE_MS: u64 = 400;
pub const NAVIGATION_SETTLE_MS: u64 = 1000;
/// Fraction of the viewport from the end that counts as "reached the end".
pub const END_THRESHOLD: f64 = 0.2;
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GalleryView {
    #[default]
    Closed,
    Horizontal,
    Grid,
    /// Single image zoomed over the grid.
    Preview(usize),
}

/// The container a scroll notification came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSource {
    /// Horizontal photo strip.
    Strip,
    /// Vertically scrolling grid.
    Grid,
}

impl ScrollSource {
    fn drives(self, view: GalleryView) -> bool {
        matches!(
            (self, view),
            (ScrollSource::Strip, GalleryView::Horizontal) | (ScrollSource::Grid, GalleryView::Grid)
        )
    }
}

/// Scroll position along the container's scrolling axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub content_len: f64,
    pub viewport_len: f64,
}

impl ScrollMetrics {
    pub fn near_end(&self) -> bool {
        self.offset + self.viewport_len >= self.content_len - self.viewport_len * END_THRESHOLD
    }

    pub fn at_start(&self) -> bool {
        self.offset <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: advance.
    Left,
    Right,
}

impl SwipeDirection {
    pub fn classify(dx: f64) -> Option<Self> {
        if dx <= -SWIPE_THRESHOLD_PX {
            Some(SwipeDirection::Left)
        } else if dx >= SWIPE_THRESHOLD_PX {
            Some(SwipeDirection::Right)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryCue {
    HideHorizontal,
    ShowGrid,
    RevealGridItem(usize),
    ShowContinue,
    HideGrid,
    ShowHorizontal,
    ShowOverlay,
    ScrollToCard,
    HideOverlay,
    NavigationSettled,
    ReleaseLock,
}

#[derive(Debug)]
pub struct Gallery {
    view: GalleryView,
    photo_count: usize,
    strip_index: usize,
    has_navigated_to_card: bool,
    navigating: bool,
    locked: bool,
    open_enabled: bool,
    scroll_ticket: u64,
}

impl Gallery {
    pub fn new(photo_count: usize) -> Self {
        Gallery {
            view: GalleryView::Closed,
            photo_count,
            strip_index: 0,
            has_navigated_to_card: false,
            navigating: false,
            locked: false,
            open_enabled: true,
            scroll_ticket: 0,
        }
    }

    pub fn view(&self) -> GalleryView {
        self.view
    }

    pub fn has_navigated_to_card(&self) -> bool {
        self.has_navigated_to_card
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    pub fn open_enabled(&self) -> bool {
        self.open_enabled
    }

    pub fn strip_index(&self) -> usize {
        self.strip_index
    }

    pub fn request_open(&mut self) -> bool {
        if !self.open_enabled || self.has_navigated_to_card || self.locked {
            tracing::debug!(
                locked = self.locked,
                navigated = self.has_navigated_to_card,
                "gallery open ignored"
            );
            return false;
        }
        if self.view != GalleryView::Closed {
            return false;
        }
        self.view = GalleryView::Horizontal;
        self.strip_index = 0;
        tracing::debug!("gallery opened");
        true
    }

    /// Registers a scroll notification; only the newest ticket settles.
    /// Scrolling in a container the current view does not show is ignored.
    pub fn note_scroll(&mut self, source: ScrollSource) -> Option<u64> {
        if !source.drives(self.view) {
            return None;
        }
        self.scroll_ticket = self.scroll_ticket.wrapping_add(1);
        Some(self.scroll_ticket)
    }

    pub fn settle_scroll(
        &mut self,
        ticket: u64,
        source: ScrollSource,
        metrics: ScrollMetrics,
    ) -> Option<Timeline<GalleryCue>> {
        if ticket != self.scroll_ticket || self.has_navigated_to_card || !source.drives(self.view) {
            return None;
        }
        match self.view {
            GalleryView::Horizontal if metrics.near_end() => {
                self.view = GalleryView::Grid;
                tracing::debug!("gallery switched to grid");
                Some(self.grid_timeline())
            }
            GalleryView::Grid if metrics.at_start() => {
                self.view = GalleryView::Horizontal;
                tracing::debug!("gallery back to horizontal strip");
                Some(
                    Timeline::new()
                        .at(0, GalleryCue::HideGrid)
                        .at(HORIZONTAL_RETURN_MS, GalleryCue::ShowHorizontal),
                )
            }
            _ => None,
        }
    }

    fn grid_timeline(&self) -> Timeline<GalleryCue> {
        let reveal_at = GRID_HANDOFF_MS + GRID_REVEAL_DELAY_MS;
        let mut timeline = Timeline::new()
            .at(0, GalleryCue::HideHorizontal)
            .at(GRID_HANDOFF_MS, GalleryCue::ShowGrid);
        for idx in 0..self.photo_count {
            timeline = timeline.at(
                reveal_at + idx as u64 * GRID_STAGGER_MS,
                GalleryCue::RevealGridItem(idx),
            );
        }
        timeline.at(reveal_at, GalleryCue::ShowContinue)
    }

    pub fn open_preview(&mut self, index: usize) -> bool {
        if self.view != GalleryView::Grid || index >= self.photo_count {
            return false;
        }
        self.view = GalleryView::Preview(index);
        true
    }

    pub fn close_preview(&mut self) -> bool {
        if !matches!(self.view, GalleryView::Preview(_)) {
            return false;
        }
        self.view = GalleryView::Grid;
        true
    }

    /// Steps the strip or the preview one photo. Returns the new index.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<usize> {
        let current = match self.view {
            GalleryView::Horizontal => self.strip_index,
            GalleryView::Preview(idx) => idx,
            _ => return None,
        };
        let next = match direction {
            SwipeDirection::Left if current + 1 < self.photo_count => current + 1,
            SwipeDirection::Right if current > 0 => current - 1,
            _ => return None,
        };
        match self.view {
            GalleryView::Preview(_) => self.view = GalleryView::Preview(next),
            _ => self.strip_index = next,
        }
        Some(next)
    }

    /// Permanently closes the gallery and heads to the greeting card.
    pub fn navigate_to_card(&mut self) -> Option<Timeline<GalleryCue>> {
        if self.navigating || self.has_navigated_to_card {
            return None;
        }
        self.navigating = true;
        self.has_navigated_to_card = true;
        self.open_enabled = false;
        self.view = GalleryView::Closed;
        tracing::info!("navigating to greeting card, gallery closed for good");
        Some(
            Timeline::new()
                .at(0, GalleryCue::ShowOverlay)
                .at(OVERLAY_FADE_MS, GalleryCue::ScrollToCard)
                .at(OVERLAY_FADE_MS * 2, GalleryCue::HideOverlay)
                .at(
                    OVERLAY_FADE_MS + NAVIGATION_SETTLE_MS,
                    GalleryCue::NavigationSettled,
                ),
        )
    }

    /// Handles `NavigationSettled`. Returns true when the opening controls
    /// must now be detached.
    pub fn finish_navigation(&mut self) -> bool {
        self.navigating = false;
        self.has_navigated_to_card
    }

    pub fn escape(&mut self) -> Option<Timeline<GalleryCue>> {
        if self.view == GalleryView::Closed {
            return None;
        }
        self.navigate_to_card()
    }

    /// A click on the greeting card closes any open view and briefly locks
    /// the gallery so the same click cannot open it.
    pub fn card_clicked(&mut self) -> Timeline<GalleryCue> {
        if matches!(self.view, GalleryView::Horizontal | GalleryView::Grid) {
            self.view = GalleryView::Closed;
        }
        self.locked = true;
        Timeline::new().at(CARD_LOCK_MS, GalleryCue::ReleaseLock)
    }

    pub fn release_lock(&mut self) {
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT_END: ScrollMetrics = ScrollMetrics {
        offset: 1700.0,
        content_len: 2400.0,
        viewport_len: 600.0,
    };
    const MIDDLE: ScrollMetrics = ScrollMetrics {
        offset: 600.0,
        content_len: 2400.0,
        viewport_len: 600.0,
    };
    const START: ScrollMetrics = ScrollMetrics {
        offset: 0.0,
        content_len: 2400.0,
        viewport_len: 600.0,
    };

    fn in_grid() -> Gallery {
        let mut gallery = Gallery::new(6);
        assert!(gallery.request_open());
        let ticket = gallery.note_scroll(ScrollSource::Strip).unwrap();
        assert!(gallery.settle_scroll(ticket, ScrollSource::Strip, AT_END).is_some());
        gallery
    }

    #[test]
    fn end_threshold() {
        assert!(AT_END.near_end());
        assert!(!MIDDLE.near_end());
        assert!(START.at_start());
    }

    #[test]
    fn open_only_from_closed() {
        let mut gallery = Gallery::new(3);
        assert!(gallery.request_open());
        assert_eq!(gallery.view(), GalleryView::Horizontal);
        assert!(!gallery.request_open());
    }

    #[test]
    fn scrolling_to_end_switches_to_grid() {
        let gallery = in_grid();
        assert_eq!(gallery.view(), GalleryView::Grid);
    }

    #[test]
    fn grid_timeline_staggers_items_and_adds_continue() {
        let mut gallery = Gallery::new(3);
        gallery.request_open();
        let ticket = gallery.note_scroll(ScrollSource::Strip).unwrap();
        let timeline = gallery.settle_scroll(ticket, ScrollSource::Strip, AT_END).unwrap();
        let reveals: Vec<_> = timeline
            .cues()
            .iter()
            .filter(|c| matches!(c.event, GalleryCue::RevealGridItem(_)))
            .map(|c| c.at.as_millis())
            .collect();
        assert_eq!(reveals, vec![500, 560, 620]);
        assert_eq!(
            timeline.offset_of(|c| *c == GalleryCue::ShowGrid).unwrap().as_millis(),
            400
        );
        assert!(timeline.events().any(|c| *c == GalleryCue::ShowContinue));
    }

    #[test]
    fn stale_scroll_tickets_are_dropped() {
        let mut gallery = Gallery::new(4);
        gallery.request_open();
        let stale = gallery.note_scroll(ScrollSource::Strip).unwrap();
        let fresh = gallery.note_scroll(ScrollSource::Strip).unwrap();
        assert!(gallery.settle_scroll(stale, ScrollSource::Strip, AT_END).is_none());
        assert_eq!(gallery.view(), GalleryView::Horizontal);
        assert!(gallery.settle_scroll(fresh, ScrollSource::Strip, MIDDLE).is_none());
        assert!(gallery.settle_scroll(fresh, ScrollSource::Strip, AT_END).is_some());
    }

    #[test]
    fn grid_returns_to_horizontal_at_start() {
        let mut gallery = in_grid();
        let ticket = gallery.note_scroll(ScrollSource::Grid).unwrap();
        let timeline = gallery.settle_scroll(ticket, ScrollSource::Grid, START).unwrap();
        assert_eq!(gallery.view(), GalleryView::Horizontal);
        assert_eq!(timeline.span().as_millis(), 300);
    }

    #[test]
    fn scroll_must_come_from_the_shown_container() {
        let mut gallery = Gallery::new(4);
        assert!(gallery.note_scroll(ScrollSource::Strip).is_none());
        gallery.request_open();
        assert!(gallery.note_scroll(ScrollSource::Grid).is_none());

        // A strip ticket cannot be settled with grid metrics, and vice versa.
        let ticket = gallery.note_scroll(ScrollSource::Strip).unwrap();
        assert!(gallery.settle_scroll(ticket, ScrollSource::Grid, AT_END).is_none());
        assert_eq!(gallery.view(), GalleryView::Horizontal);
        assert!(gallery.settle_scroll(ticket, ScrollSource::Strip, AT_END).is_some());

        // The hidden strip sitting at offset zero does not pull the grid back.
        let ticket = gallery.note_scroll(ScrollSource::Grid).unwrap();
        assert!(gallery.settle_scroll(ticket, ScrollSource::Strip, START).is_none());
        assert_eq!(gallery.view(), GalleryView::Grid);
    }

    #[test]
    fn preview_only_from_grid() {
        let mut gallery = Gallery::new(4);
        assert!(!gallery.open_preview(0));
        gallery.request_open();
        assert!(!gallery.open_preview(0));

        let mut gallery = in_grid();
        assert!(!gallery.open_preview(10));
        assert!(gallery.open_preview(2));
        assert_eq!(gallery.view(), GalleryView::Preview(2));
        assert!(gallery.close_preview());
        assert_eq!(gallery.view(), GalleryView::Grid);
        assert!(!gallery.has_navigated_to_card());
    }

    #[test]
    fn continue_is_terminal() {
        let mut gallery = in_grid();
        let timeline = gallery.navigate_to_card().unwrap();
        assert_eq!(gallery.view(), GalleryView::Closed);
        assert!(gallery.has_navigated_to_card());
        assert!(gallery.is_navigating());
        assert!(gallery.navigate_to_card().is_none());
        assert_eq!(timeline.span().as_millis(), 1400);

        assert!(gallery.finish_navigation());
        assert!(!gallery.is_navigating());
        assert!(!gallery.request_open());
        assert_eq!(gallery.view(), GalleryView::Closed);
    }

    #[test]
    fn closing_the_strip_heads_to_card() {
        let mut gallery = Gallery::new(2);
        gallery.request_open();
        let timeline = gallery.navigate_to_card().unwrap();
        assert_eq!(timeline.cues()[0].event, GalleryCue::ShowOverlay);
        assert_eq!(gallery.view(), GalleryView::Closed);
        assert!(gallery.has_navigated_to_card());
        assert!(!gallery.request_open());
    }

    #[test]
    fn navigated_gallery_ignores_scroll() {
        let mut gallery = Gallery::new(4);
        gallery.request_open();
        let ticket = gallery.note_scroll(ScrollSource::Strip).unwrap();
        gallery.navigate_to_card();
        assert!(gallery.settle_scroll(ticket, ScrollSource::Strip, AT_END).is_none());
        assert_eq!(gallery.view(), GalleryView::Closed);
    }

    #[test]
    fn escape_from_any_open_view_navigates() {
        let mut gallery = Gallery::new(4);
        assert!(gallery.escape().is_none());
        assert!(!gallery.has_navigated_to_card());

        let mut gallery = in_grid();
        gallery.open_preview(1);
        assert!(gallery.escape().is_some());
        assert_eq!(gallery.view(), GalleryView::Closed);
        assert!(gallery.has_navigated_to_card());
    }

    #[test]
    fn card_click_locks_gallery_briefly() {
        let mut gallery = Gallery::new(4);
        let timeline = gallery.card_clicked();
        assert!(gallery.is_locked());
        assert!(!gallery.request_open());
        assert_eq!(timeline.span().as_millis() as u64, CARD_LOCK_MS);
        gallery.release_lock();
        assert!(gallery.request_open());
    }

    #[test]
    fn card_click_closes_open_views_without_navigating() {
        let mut gallery = in_grid();
        gallery.card_clicked();
        assert_eq!(gallery.view(), GalleryView::Closed);
        assert!(!gallery.has_navigated_to_card());
    }

    #[test]
    fn swipe_steps_within_bounds() {
        assert_eq!(SwipeDirection::classify(-80.0), Some(SwipeDirection::Left));
        assert_eq!(SwipeDirection::classify(49.0), None);
        assert_eq!(SwipeDirection::classify(50.0), Some(SwipeDirection::Right));

        let mut gallery = Gallery::new(2);
        assert_eq!(gallery.swipe(SwipeDirection::Left), None);
        gallery.request_open();
        assert_eq!(gallery.swipe(SwipeDirection::Right), None);
        assert_eq!(gallery.swipe(SwipeDirection::Left), Some(1));
        assert_eq!(gallery.swipe(SwipeDirection::Left), None);
        assert_eq!(gallery.strip_index(), 1);
    }

    #[test]
    fn swipe_in_preview_changes_image() {
        let mut gallery = in_grid();
        gallery.open_preview(0);
        assert_eq!(gallery.swipe(SwipeDirection::Left), Some(1));
        assert_eq!(gallery.view(), GalleryView::Preview(1));
    }
}
