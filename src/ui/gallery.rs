use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gtk4 as gtk;
use gtk4::graphene;
use gtk4::prelude::*;

use birthday_surprise::gallery::{
    GalleryCue, GalleryView, ScrollMetrics, ScrollSource, SwipeDirection, SCROLL_DEBOUNCE_MS,
};

use super::app::play_timeline;
use super::media::photo_widget;
use super::state::{AppState, GalleryWidgets};

const SCROLL_MARGIN: f64 = 24.0;

fn metrics_of(adjustment: &gtk::Adjustment) -> ScrollMetrics {
    ScrollMetrics {
        offset: adjustment.value(),
        content_len: adjustment.upper(),
        viewport_len: adjustment.page_size(),
    }
}

/// Debounced scroll handling shared by the strip and the grid. Only the
/// newest notification inside the window settles.
fn on_scrolled(state: &Rc<RefCell<AppState>>, adjustment: &gtk::Adjustment, source: ScrollSource) {
    let Some(ticket) = state.borrow_mut().gallery.note_scroll(source) else {
        return;
    };
    let state_weak = Rc::downgrade(state);
    let adjustment = adjustment.clone();
    glib::timeout_add_local_once(Duration::from_millis(SCROLL_DEBOUNCE_MS), move || {
        let Some(state) = state_weak.upgrade() else {
            return;
        };
        let timeline = state
            .borrow_mut()
            .gallery
            .settle_scroll(ticket, source, metrics_of(&adjustment));
        if let Some(timeline) = timeline {
            play_timeline(&state, timeline, apply_gallery_cue);
        }
    });
}

fn handle_open(state: &Rc<RefCell<AppState>>) {
    let opened = state.borrow_mut().gallery.request_open();
    if opened {
        sync_gallery_views(state);
    }
}

fn handle_continue(state: &Rc<RefCell<AppState>>) {
    let timeline = state.borrow_mut().gallery.navigate_to_card();
    if let Some(timeline) = timeline {
        play_timeline(state, timeline, apply_gallery_cue);
    }
}

fn handle_swipe(state: &Rc<RefCell<AppState>>, dx: f64) {
    let Some(direction) = SwipeDirection::classify(dx) else {
        return;
    };
    let (index, view) = {
        let mut st = state.borrow_mut();
        let Some(index) = st.gallery.swipe(direction) else {
            return;
        };
        (index, st.gallery.view())
    };
    tracing::debug!(?direction, index, "gallery swipe");
    if let GalleryView::Preview(_) = view {
        if let Some(stack) = &state.borrow().gallery_widgets.preview_stack {
            stack.set_visible_child_name(&format!("photo-{index}"));
        }
        return;
    }
    let (strip, count) = {
        let st = state.borrow();
        (
            st.gallery_widgets.strip.clone(),
            st.gallery_widgets.strip_items.len().max(1) as f64,
        )
    };
    // Moving the adjustment re-enters the scroll handler.
    if let Some(strip) = strip {
        let adjustment = strip.hadjustment();
        adjustment.set_value(adjustment.upper() / count * index as f64);
    }
}

fn gallery_close_button(state: &Rc<RefCell<AppState>>) -> gtk::Button {
    let button = gtk::Button::builder()
        .icon_name("window-close-symbolic")
        .halign(gtk::Align::End)
        .tooltip_text("Close gallery")
        .build();
    button.add_css_class("circular");
    button.add_css_class("gallery-close");
    button.set_visible(false);
    button.connect_clicked({
        let state = state.clone();
        move |_| handle_continue(&state)
    });
    button
}

fn show_close_buttons(widgets: &GalleryWidgets, strip: bool, grid: bool) {
    if let Some(button) = &widgets.close_strip {
        button.set_visible(strip);
    }
    if let Some(button) = &widgets.close_grid {
        button.set_visible(grid);
    }
}

fn swipe_gesture(state: &Rc<RefCell<AppState>>) -> gtk::GestureDrag {
    let drag = gtk::GestureDrag::new();
    drag.connect_drag_end({
        let state = state.clone();
        move |_, dx, _| handle_swipe(&state, dx)
    });
    drag
}

pub(super) fn build_gallery_block(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.add_css_class("gallery-block");

    let heading = gtk::Label::new(Some("Our Memories"));
    heading.add_css_class("title-2");

    let (photos, placeholder) = {
        let st = state.borrow();
        (st.config.photos.clone(), st.config.placeholder_caption())
    };

    let open_button = gtk::Button::with_label("Open Gallery");
    open_button.add_css_class("pill");
    open_button.set_halign(gtk::Align::Center);
    let open_handler = open_button.connect_clicked({
        let state = state.clone();
        move |_| handle_open(&state)
    });

    let strip_row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    strip_row.add_css_class("gallery-strip-row");
    let mut strip_items = Vec::with_capacity(photos.len());
    for photo in &photos {
        let item = photo_widget(photo, &placeholder);
        item.add_css_class("gallery-strip-item");
        item.set_size_request(220, 220);
        strip_row.append(&item);
        strip_items.push(item);
    }
    let strip = gtk::ScrolledWindow::builder()
        .vscrollbar_policy(gtk::PolicyType::Never)
        .hscrollbar_policy(gtk::PolicyType::Automatic)
        .min_content_height(240)
        .child(&strip_row)
        .build();
    strip.add_css_class("gallery-strip");
    strip.set_visible(false);
    strip.hadjustment().connect_value_changed({
        let state = state.clone();
        move |adjustment| on_scrolled(&state, adjustment, ScrollSource::Strip)
    });
    strip.add_controller(swipe_gesture(state));
    let close_strip = gallery_close_button(state);

    let flow = gtk::FlowBox::builder()
        .selection_mode(gtk::SelectionMode::None)
        .homogeneous(true)
        .min_children_per_line(2)
        .max_children_per_line(3)
        .row_spacing(8)
        .column_spacing(8)
        .build();
    let mut grid_items = Vec::with_capacity(photos.len());
    for photo in &photos {
        let child = gtk::FlowBoxChild::new();
        child.add_css_class("gallery-grid-item");
        let tile = photo_widget(photo, &placeholder);
        tile.set_size_request(140, 140);
        child.set_child(Some(&tile));
        flow.append(&child);
        grid_items.push(child);
    }
    flow.connect_child_activated({
        let state = state.clone();
        move |_, child| {
            let Ok(index) = usize::try_from(child.index()) else {
                return;
            };
            let opened = state.borrow_mut().gallery.open_preview(index);
            if opened {
                sync_gallery_views(&state);
            }
        }
    });
    let grid = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .min_content_height(320)
        .child(&flow)
        .build();
    grid.add_css_class("gallery-grid");
    grid.set_visible(false);
    grid.vadjustment().connect_value_changed({
        let state = state.clone();
        move |adjustment| on_scrolled(&state, adjustment, ScrollSource::Grid)
    });
    let close_grid = gallery_close_button(state);

    let continue_button = gtk::Button::with_label("Continue to Birthday Card");
    continue_button.add_css_class("suggested-action");
    continue_button.add_css_class("pill");
    continue_button.set_halign(gtk::Align::Center);
    continue_button.set_visible(false);
    continue_button.connect_clicked({
        let state = state.clone();
        move |_| handle_continue(&state)
    });

    root.append(&heading);
    root.append(&open_button);
    root.append(&close_strip);
    root.append(&strip);
    root.append(&close_grid);
    root.append(&grid);
    root.append(&continue_button);

    {
        let mut st = state.borrow_mut();
        let widgets = &mut st.gallery_widgets;
        widgets.open_button = Some(open_button);
        widgets.open_handler = Some(open_handler);
        widgets.strip = Some(strip);
        widgets.close_strip = Some(close_strip);
        widgets.close_grid = Some(close_grid);
        widgets.strip_items = strip_items;
        widgets.grid = Some(grid);
        widgets.grid_items = grid_items;
        widgets.continue_button = Some(continue_button);
    }
    root
}

pub(super) fn build_preview_overlay(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.add_css_class("gallery-preview");
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.set_visible(false);

    let close_button = gtk::Button::builder()
        .icon_name("window-close-symbolic")
        .halign(gtk::Align::End)
        .build();
    close_button.add_css_class("circular");
    close_button.set_margin_top(12);
    close_button.set_margin_end(12);
    close_button.set_tooltip_text(Some("Close"));
    close_button.connect_clicked({
        let state = state.clone();
        move |_| {
            let closed = state.borrow_mut().gallery.close_preview();
            if closed {
                sync_gallery_views(&state);
            }
        }
    });

    let stack = gtk::Stack::new();
    stack.set_transition_type(gtk::StackTransitionType::Crossfade);
    stack.set_hexpand(true);
    stack.set_vexpand(true);
    {
        let st = state.borrow();
        let placeholder = st.config.placeholder_caption();
        for (idx, photo) in st.config.photos.iter().enumerate() {
            let widget = photo_widget(photo, &placeholder);
            stack.add_named(&widget, Some(&format!("photo-{idx}")));
        }
    }
    stack.add_controller(swipe_gesture(state));

    root.append(&close_button);
    root.append(&stack);

    {
        let mut st = state.borrow_mut();
        st.gallery_widgets.preview = Some(root.clone().upcast());
        st.gallery_widgets.preview_stack = Some(stack);
    }
    root
}

pub(super) fn build_transition_overlay(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.add_css_class("transition-overlay");
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.set_can_target(false);
    root.set_visible(false);

    let label = gtk::Label::new(Some("💝"));
    label.add_css_class("transition-icon");
    label.set_vexpand(true);
    root.append(&label);

    state.borrow_mut().gallery_widgets.transition_overlay = Some(root.clone().upcast());
    root
}

/// Brings the widgets in line with the gallery state after an instant
/// transition.
pub(super) fn sync_gallery_views(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    let widgets = &st.gallery_widgets;
    let view = st.gallery.view();

    let strip_open = view == GalleryView::Horizontal;
    let grid_open = matches!(view, GalleryView::Grid | GalleryView::Preview(_));

    if let Some(strip) = &widgets.strip {
        strip.set_visible(strip_open);
        set_class(strip, "shown", strip_open);
    }
    if let Some(grid) = &widgets.grid {
        grid.set_visible(grid_open);
        set_class(grid, "shown", grid_open);
    }
    for item in &widgets.grid_items {
        set_class(item, "revealed", grid_open);
    }
    if let Some(button) = &widgets.continue_button {
        button.set_visible(grid_open);
    }
    show_close_buttons(widgets, strip_open, grid_open);
    if let Some(button) = &widgets.open_button {
        button.set_visible(
            view == GalleryView::Closed
                && st.gallery.open_enabled()
                && widgets.open_handler.is_some(),
        );
    }
    if let Some(preview) = &widgets.preview {
        preview.set_visible(matches!(view, GalleryView::Preview(_)));
    }
    if let (GalleryView::Preview(idx), Some(stack)) = (view, &widgets.preview_stack) {
        stack.set_visible_child_name(&format!("photo-{idx}"));
    }
}

fn set_class(widget: &impl IsA<gtk::Widget>, class: &str, on: bool) {
    if on {
        widget.add_css_class(class);
    } else {
        widget.remove_css_class(class);
    }
}

fn scroll_card_into_view(st: &AppState) {
    let (Some(scroller), Some(card)) = (&st.gallery_widgets.main_scroller, &st.card_widgets.shell) else {
        return;
    };
    let Some(content) = scroller.child() else {
        return;
    };
    if let Some(point) = card.compute_point(&content, &graphene::Point::zero()) {
        let adjustment = scroller.vadjustment();
        adjustment.set_value((point.y() as f64 - SCROLL_MARGIN).max(0.0));
    }
}

fn detach_open_control(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let handler = st.gallery_widgets.open_handler.take();
    if let Some(button) = &st.gallery_widgets.open_button {
        if let Some(handler) = handler {
            button.disconnect(handler);
        }
        button.set_sensitive(false);
        button.set_visible(false);
    }
    tracing::debug!("gallery opening control detached");
}

pub(super) fn apply_gallery_cue(state: &Rc<RefCell<AppState>>, cue: GalleryCue) {
    match cue {
        GalleryCue::NavigationSettled => {
            let detach = state.borrow_mut().gallery.finish_navigation();
            if let Some(overlay) = &state.borrow().gallery_widgets.transition_overlay {
                overlay.set_visible(false);
            }
            if detach {
                detach_open_control(state);
            }
            return;
        }
        GalleryCue::ReleaseLock => {
            state.borrow_mut().gallery.release_lock();
            return;
        }
        GalleryCue::ShowOverlay => {
            sync_gallery_views(state);
        }
        _ => {}
    }

    let st = state.borrow();
    let widgets = &st.gallery_widgets;
    let view = st.gallery.view();
    let grid_current = matches!(view, GalleryView::Grid | GalleryView::Preview(_));
    match cue {
        GalleryCue::HideHorizontal => {
            if let Some(strip) = &widgets.strip {
                strip.remove_css_class("shown");
            }
            show_close_buttons(widgets, false, false);
        }
        GalleryCue::ShowGrid if grid_current => {
            if let Some(strip) = &widgets.strip {
                strip.set_visible(false);
            }
            if let Some(grid) = &widgets.grid {
                grid.set_visible(true);
                grid.add_css_class("shown");
            }
            show_close_buttons(widgets, false, true);
        }
        GalleryCue::RevealGridItem(idx) if grid_current => {
            if let Some(item) = widgets.grid_items.get(idx) {
                item.add_css_class("revealed");
            }
        }
        GalleryCue::ShowContinue if grid_current => {
            if let Some(button) = &widgets.continue_button {
                button.set_visible(true);
            }
        }
        GalleryCue::HideGrid => {
            if let Some(grid) = &widgets.grid {
                grid.remove_css_class("shown");
            }
            if let Some(button) = &widgets.continue_button {
                button.set_visible(false);
            }
            show_close_buttons(widgets, false, false);
        }
        GalleryCue::ShowHorizontal if view == GalleryView::Horizontal => {
            if let Some(grid) = &widgets.grid {
                grid.set_visible(false);
            }
            for item in &widgets.grid_items {
                item.remove_css_class("revealed");
            }
            if let Some(strip) = &widgets.strip {
                strip.set_visible(true);
                strip.add_css_class("shown");
            }
            show_close_buttons(widgets, true, false);
        }
        GalleryCue::ShowOverlay => {
            if let Some(overlay) = &widgets.transition_overlay {
                overlay.set_visible(true);
                overlay.add_css_class("shown");
            }
        }
        GalleryCue::ScrollToCard => scroll_card_into_view(&st),
        GalleryCue::HideOverlay => {
            if let Some(overlay) = &widgets.transition_overlay {
                overlay.remove_css_class("shown");
            }
        }
        _ => tracing::debug!(?cue, ?view, "stale gallery cue ignored"),
    }
}
