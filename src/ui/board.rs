use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::pango;
use gtk4::prelude::*;

use birthday_surprise::balloons::{
    ambient_particles, Balloon, BalloonId, GameAction, GameCue, PopOutcome, GAME_START_DELAY_MS,
};
use birthday_surprise::effects::{confetti_launch, BurstConfig};
use birthday_surprise::sections::Section;

use super::app::{celebrate, launch_confetti, play_timeline};
use super::hud::update_counter;
use super::scene::{switch_section, CONTENT_MARGIN};
use super::state::AppState;

fn parse_color(token: &str) -> gdk::RGBA {
    gdk::RGBA::parse(token).unwrap_or(gdk::RGBA::WHITE)
}

fn draw_balloon(
    cr: &cairo::Context,
    width: f64,
    balloon_height: f64,
    total_height: f64,
    color: gdk::RGBA,
    special: bool,
) {
    cr.set_antialias(cairo::Antialias::Best);

    // String first so the knot covers it.
    cr.set_source_rgba(0.55, 0.55, 0.55, 0.9);
    cr.set_line_width(1.2);
    cr.move_to(width / 2.0, balloon_height);
    cr.curve_to(
        width / 2.0 - 6.0,
        balloon_height + (total_height - balloon_height) * 0.35,
        width / 2.0 + 6.0,
        balloon_height + (total_height - balloon_height) * 0.7,
        width / 2.0,
        total_height,
    );
    let _ = cr.stroke();

    cr.save().ok();
    cr.translate(width / 2.0, balloon_height / 2.0);
    cr.scale(width / 2.0, balloon_height / 2.0);
    cr.arc(0.0, 0.0, 0.96, 0.0, 2.0 * PI);
    cr.restore().ok();
    cr.set_source_rgba(
        color.red() as f64,
        color.green() as f64,
        color.blue() as f64,
        color.alpha() as f64,
    );
    let _ = cr.fill();

    // Highlight.
    cr.set_source_rgba(1.0, 1.0, 1.0, 0.35);
    cr.arc(width * 0.35, balloon_height * 0.3, width * 0.1, 0.0, 2.0 * PI);
    let _ = cr.fill();

    // Knot.
    cr.set_source_rgba(
        color.red() as f64 * 0.8,
        color.green() as f64 * 0.8,
        color.blue() as f64 * 0.8,
        1.0,
    );
    cr.move_to(width / 2.0 - 4.0, balloon_height + 4.0);
    cr.line_to(width / 2.0 + 4.0, balloon_height + 4.0);
    cr.line_to(width / 2.0, balloon_height - 2.0);
    cr.close_path();
    let _ = cr.fill();

    if special {
        draw_star(cr, width, balloon_height);
    }
}

fn draw_star(cr: &cairo::Context, width: f64, balloon_height: f64) {
    let layout = pangocairo::functions::create_layout(cr);
    let mut font_desc = pango::FontDescription::new();
    font_desc.set_family("Cantarell, Noto Sans, sans");
    font_desc.set_weight(pango::Weight::Bold);
    font_desc.set_size((width * 0.32 * pango::SCALE as f64) as i32);
    layout.set_font_description(Some(&font_desc));
    layout.set_text("★");

    let (text_width, text_height) = layout.pixel_size();
    cr.set_source_rgba(1.0, 1.0, 1.0, 0.85);
    cr.move_to(
        (width - text_width as f64) / 2.0,
        (balloon_height - text_height as f64) / 2.0,
    );
    pangocairo::functions::show_layout(cr, &layout);
}

fn balloon_widget(state: &Rc<RefCell<AppState>>, balloon: &Balloon) -> gtk::DrawingArea {
    let width = balloon.size_px as f64;
    let balloon_height = balloon.height_px();
    let total_height = balloon_height + balloon.string_px();
    let color = parse_color(balloon.color);
    let special = balloon.is_special;

    let area = gtk::DrawingArea::builder()
        .content_width(width as i32)
        .content_height(total_height as i32)
        .css_classes(vec!["balloon"])
        .build();
    area.set_cursor_from_name(Some("pointer"));
    area.set_draw_func(move |_, cr, _, _| {
        draw_balloon(cr, width, balloon_height, total_height, color, special);
    });

    let click = gtk::GestureClick::new();
    let id = balloon.id;
    click.connect_pressed({
        let state = state.clone();
        move |_, _, _, _| handle_balloon_click(&state, id)
    });
    area.add_controller(click);
    area
}

fn place(area: &gtk::Fixed, widget: &impl IsA<gtk::Widget>, x_pct: f64, y_pct: f64, size: (f64, f64)) {
    let x = size.0 * x_pct / 100.0;
    let y = size.1 * y_pct / 100.0;
    if widget.as_ref().parent().is_some() {
        area.move_(widget, x, y);
    } else {
        area.put(widget, x, y);
    }
}

fn area_size(area: &gtk::Fixed) -> (f64, f64) {
    (area.width() as f64, area.height() as f64)
}

/// Re-applies the percentage positions after the field changes size.
fn relayout(state: &Rc<RefCell<AppState>>, size: (f64, f64)) {
    let st = state.borrow();
    let Some(area) = &st.game_widgets.play_area else {
        return;
    };
    for balloon in st.game.balloons() {
        if let Some(widget) = st.game_widgets.balloons.get(&balloon.id) {
            place(area, widget, balloon.x_pct, balloon.y_pct, size);
        }
    }
}

pub(super) fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("game-root");
    root.set_margin_top(CONTENT_MARGIN);
    root.set_margin_bottom(CONTENT_MARGIN);
    root.set_margin_start(CONTENT_MARGIN);
    root.set_margin_end(CONTENT_MARGIN);

    let heading = gtk::Label::new(Some("Pop the balloons to find your cake!"));
    heading.add_css_class("title-2");
    heading.set_wrap(true);
    heading.set_justify(gtk::Justification::Center);

    let counter_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    counter_row.set_halign(gtk::Align::Center);
    let counter_caption = gtk::Label::new(Some("Pops"));
    counter_caption.add_css_class("dim-label");
    let counter_label = gtk::Label::new(Some(&state.borrow().game.counter_label()));
    counter_label.add_css_class("balloon-counter");
    counter_label.add_css_class("numeric");
    counter_row.append(&counter_caption);
    counter_row.append(&counter_label);

    let overlay = gtk::Overlay::new();
    overlay.set_hexpand(true);
    overlay.set_vexpand(true);
    overlay.add_css_class("balloon-field");

    // Overlay children share the backdrop's allocation, so its resize
    // drives the balloon layout.
    let backdrop = gtk::DrawingArea::new();
    backdrop.set_hexpand(true);
    backdrop.set_vexpand(true);
    backdrop.add_css_class("balloon-backdrop");
    let state_weak = Rc::downgrade(state);
    backdrop.connect_resize(move |_, width, height| {
        if let Some(state) = state_weak.upgrade() {
            relayout(&state, (width as f64, height as f64));
        }
    });

    let ambient_layer = gtk::Fixed::new();
    ambient_layer.set_can_target(false);
    ambient_layer.add_css_class("ambient-layer");

    let play_area = gtk::Fixed::new();
    play_area.set_hexpand(true);
    play_area.set_vexpand(true);

    let found_label = gtk::Label::new(Some("🎂 You found the cake!"));
    found_label.add_css_class("found-cake");
    found_label.add_css_class("title-1");
    found_label.set_halign(gtk::Align::Center);
    found_label.set_valign(gtk::Align::Center);
    found_label.set_can_target(false);
    found_label.set_visible(false);

    overlay.set_child(Some(&backdrop));
    overlay.add_overlay(&ambient_layer);
    overlay.add_overlay(&play_area);
    overlay.add_overlay(&found_label);

    root.append(&heading);
    root.append(&counter_row);
    root.append(&overlay);

    {
        let mut st = state.borrow_mut();
        st.game_widgets.play_area = Some(play_area);
        st.game_widgets.ambient_layer = Some(ambient_layer);
        st.game_widgets.counter_label = Some(counter_label);
        st.game_widgets.found_label = Some(found_label);
    }
    root
}

/// Starts the first round unless the player already left the game or a
/// round is running.
pub(super) fn start_first_round(state: &Rc<RefCell<AppState>>) {
    let ready = {
        let st = state.borrow();
        st.sections.is_active(Section::Game) && !st.game_started
    };
    if ready {
        start_round(state);
    }
}

/// Delayed first round for instant jumps, which carry no cue timeline.
pub(super) fn schedule_game_start(state: &Rc<RefCell<AppState>>) {
    if state.borrow().game_started {
        return;
    }
    let state_weak = Rc::downgrade(state);
    glib::timeout_add_local_once(Duration::from_millis(GAME_START_DELAY_MS), move || {
        if let Some(state) = state_weak.upgrade() {
            start_first_round(&state);
        }
    });
}

pub(super) fn start_round(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let device = st.device;
    st.game.start_game(device, &mut rand::rng());
    st.game_started = true;

    if let Some(area) = &st.game_widgets.play_area {
        while let Some(child) = area.first_child() {
            area.remove(&child);
        }
    }
    if let Some(label) = &st.game_widgets.found_label {
        label.set_visible(false);
    }

    let balloons: Vec<Balloon> = st.game.balloons().to_vec();
    let mut widgets = std::collections::HashMap::with_capacity(balloons.len());
    if let Some(area) = st.game_widgets.play_area.clone() {
        let size = area_size(&area);
        for balloon in &balloons {
            let widget = balloon_widget(state, balloon);
            place(&area, &widget, balloon.x_pct, balloon.y_pct, size);
            widgets.insert(balloon.id, widget);
        }
    }
    st.game_widgets.balloons = widgets;

    if let Some(layer) = &st.game_widgets.ambient_layer {
        while let Some(child) = layer.first_child() {
            layer.remove(&child);
        }
        let size = area_size(layer);
        for particle in ambient_particles(&mut rand::rng()) {
            let dot = gtk::Label::new(None);
            dot.set_markup(&format!(
                "<span foreground=\"{}\" size=\"{}pt\">●</span>",
                particle.color, particle.size_px
            ));
            dot.add_css_class("ambient-particle");
            place(layer, &dot, particle.x_pct, particle.y_pct, size);
        }
    }
    update_counter(&st);
}

fn handle_balloon_click(state: &Rc<RefCell<AppState>>, id: BalloonId) {
    let pop = state.borrow_mut().game.pop_balloon(id);
    match pop.outcome {
        PopOutcome::Ignored => return,
        PopOutcome::Popped { attempts_used } => {
            tracing::debug!(attempts_used, "pop registered");
        }
        PopOutcome::Completed => {
            tracing::info!("balloon game complete");
        }
    }
    update_counter(&state.borrow());
    play_timeline(state, pop.cues, apply_game_cue);
}

fn balloon_origin(st: &AppState, id: BalloonId) -> Option<(f64, f64)> {
    let balloon = st.game.balloon(id)?;
    let widget = st.game_widgets.balloons.get(&id)?;
    let window = st.window.as_ref()?;
    let center = gtk::graphene::Point::new(balloon.size_px as f32 / 2.0, balloon.height_px() as f32 / 2.0);
    let point = widget.compute_point(window, &center)?;
    let (w, h) = (window.width() as f64, window.height() as f64);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some((point.x() as f64 / w, point.y() as f64 / h))
}

fn apply_game_cue(state: &Rc<RefCell<AppState>>, cue: GameCue) {
    if !state.borrow().game.is_current(&cue) {
        tracing::debug!(round = cue.round, "stale balloon cue dropped");
        return;
    }
    match cue.action {
        GameAction::Burst { id, special } => {
            let burst = {
                let st = state.borrow();
                if let Some(widget) = st.game_widgets.balloons.get(&id) {
                    widget.add_css_class("popping");
                }
                let color = st.game.balloon(id).map(|b| b.color).unwrap_or("#FFFFFF");
                balloon_origin(&st, id).map(|origin| BurstConfig::pop(origin, color, special))
            };
            if let Some(burst) = burst {
                celebrate(state, &burst);
            }
        }
        GameAction::Remove(id) => {
            let mut st = state.borrow_mut();
            st.game.remove_balloon(id);
            let widget = st.game_widgets.balloons.remove(&id);
            if let (Some(widget), Some(area)) = (widget, &st.game_widgets.play_area) {
                area.remove(&widget);
            }
        }
        GameAction::RevealCake => {
            if let Some(label) = &state.borrow().game_widgets.found_label {
                label.set_visible(true);
            }
            launch_confetti(state, confetti_launch());
        }
        GameAction::RequestCake => switch_section(state, Some(Section::Game), Section::Cake),
    }
}
