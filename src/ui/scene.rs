use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::graphene;
use gtk4::prelude::*;

use birthday_surprise::effects::{confetti_launch, BurstConfig};
use birthday_surprise::sections::{cake_buildup, CakeCue, CakeLayer, Section, SectionCue};

use super::app::{celebrate, launch_confetti, play_timeline};
use super::board::{schedule_game_start, start_first_round};
use super::card::build_card;
use super::effects::spawn_sparkles;
use super::gallery::build_gallery_block;
use super::hud::{set_header_for_section, start_music};
use super::state::AppState;

pub const CONTENT_MARGIN: i32 = 24;

fn with_section_widget(state: &Rc<RefCell<AppState>>, section: Section, f: impl FnOnce(&gtk::Widget)) {
    let widget = state.borrow().views.get(section).cloned();
    if let Some(widget) = widget {
        f(&widget);
    }
}

pub(super) fn show_initial_section(state: &Rc<RefCell<AppState>>) {
    let initial = state.borrow().sections.active();
    if let Some(section) = initial {
        with_section_widget(state, section, |widget| {
            widget.set_visible(true);
            widget.add_css_class("shown");
        });
    }
}

pub(super) fn switch_section(state: &Rc<RefCell<AppState>>, from: Option<Section>, to: Section) {
    let timeline = state.borrow_mut().sections.switch_section(from, to);
    match timeline {
        Some(timeline) => play_timeline(state, timeline, apply_section_cue),
        None => tracing::debug!(to = to.name(), "section switch dropped"),
    }
}

pub(super) fn apply_section_cue(state: &Rc<RefCell<AppState>>, cue: SectionCue) {
    match cue {
        SectionCue::Reveal(section) => with_section_widget(state, section, |widget| {
            widget.remove_css_class("shown");
            widget.set_visible(true);
        }),
        SectionCue::FadeOut(section) => with_section_widget(state, section, |widget| {
            widget.remove_css_class("shown");
        }),
        SectionCue::FadeIn(section) => {
            if !state.borrow().sections.is_active(section) {
                return;
            }
            with_section_widget(state, section, |widget| widget.add_css_class("shown"));
        }
        SectionCue::Retire(section) => {
            if state.borrow_mut().sections.retire(section) {
                with_section_widget(state, section, |widget| widget.set_visible(false));
            }
        }
        SectionCue::Settled(section) => settle_section(state, section),
        SectionCue::StartGame => start_first_round(state),
    }
}

fn settle_section(state: &Rc<RefCell<AppState>>, section: Section) {
    set_header_for_section(state);
    let celebrate_now = state.borrow_mut().sections.finish_fade_in(section);
    if celebrate_now {
        celebrate_cake(state);
    }
}

/// Instant switch without a fade. Returns false when the controller
/// refused it.
pub(super) fn jump_to_section(state: &Rc<RefCell<AppState>>, to: Section) -> bool {
    let from = {
        let mut st = state.borrow_mut();
        let Some(from) = st.sections.active() else {
            return false;
        };
        if !st.sections.jump(from, to) {
            return false;
        }
        from
    };
    with_section_widget(state, from, |widget| {
        widget.remove_css_class("shown");
        widget.set_visible(false);
    });
    with_section_widget(state, to, |widget| {
        widget.set_visible(true);
        widget.add_css_class("shown");
    });
    tracing::debug!(from = from.name(), to = to.name(), "jumped to section");
    if to == Section::Game {
        schedule_game_start(state);
    }
    settle_section(state, to);
    true
}

fn start_greeting(state: &Rc<RefCell<AppState>>) {
    if jump_to_section(state, Section::Main) {
        start_music(state);
    }
}

pub(super) fn build_intro_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("intro-root");

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.add_css_class("intro-content");

    let (headline, recipient, message) = {
        let st = state.borrow();
        (
            st.config.headline.clone(),
            st.config.recipient.clone(),
            st.config.intro_message.clone(),
        )
    };

    let icon = gtk::Label::new(Some("🎈"));
    icon.add_css_class("intro-icon");

    let title = gtk::Label::new(Some(&format!("{headline} {recipient}")));
    title.add_css_class("intro-title");
    title.add_css_class("title-1");
    title.set_wrap(true);
    title.set_justify(gtk::Justification::Center);

    let subtitle = gtk::Label::new(Some(&message));
    subtitle.add_css_class("body");
    subtitle.set_wrap(true);
    subtitle.set_justify(gtk::Justification::Center);
    subtitle.set_max_width_chars(36);

    let start_button = gtk::Button::with_label("Open Your Surprise");
    start_button.add_css_class("suggested-action");
    start_button.add_css_class("pill");
    start_button.set_halign(gtk::Align::Center);
    start_button.set_margin_top(12);
    start_button.connect_clicked({
        let state = state.clone();
        move |_| start_greeting(&state)
    });

    content.append(&icon);
    content.append(&title);
    content.append(&subtitle);
    content.append(&start_button);
    center.set_center_widget(Some(&content));
    root.append(&center);
    root
}

pub(super) fn build_main_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("main-root");

    let scroller = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .hexpand(true)
        .vexpand(true)
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 32);
    content.set_halign(gtk::Align::Center);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);
    content.set_size_request(320, -1);

    let recipient = state.borrow().config.recipient.clone();
    let title = gtk::Label::new(Some(&format!("Happy Birthday, {recipient}!")));
    title.add_css_class("main-title");
    title.add_css_class("title-1");
    title.set_wrap(true);
    title.set_justify(gtk::Justification::Center);

    let gallery_block = build_gallery_block(state);
    let card = build_card(state);

    let game_button = gtk::Button::with_label("Play a Little Game");
    game_button.add_css_class("suggested-action");
    game_button.add_css_class("pill");
    game_button.set_halign(gtk::Align::Center);
    game_button.connect_clicked({
        let state = state.clone();
        move |_| switch_section(&state, Some(Section::Main), Section::Game)
    });

    content.append(&title);
    content.append(&gallery_block);
    content.append(&card);
    content.append(&game_button);
    scroller.set_child(Some(&content));
    root.append(&scroller);

    state.borrow_mut().gallery_widgets.main_scroller = Some(scroller);
    root
}

pub(super) fn build_cake_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("cake-root");

    let overlay = gtk::Overlay::new();
    overlay.set_hexpand(true);
    overlay.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 0);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);

    let message = gtk::Label::new(Some("You found the cake!"));
    message.add_css_class("cake-message");
    message.add_css_class("title-2");
    message.set_margin_bottom(24);

    let cake = gtk::Box::new(gtk::Orientation::Vertical, 0);
    cake.set_halign(gtk::Align::Center);
    cake.add_css_class("cake");

    // Top to bottom on screen; built bottom-up by the cue sequence.
    let mut layers = Vec::new();
    for layer in [
        CakeLayer::Flame,
        CakeLayer::Candle,
        CakeLayer::Top,
        CakeLayer::Middle,
        CakeLayer::Bottom,
    ] {
        let piece = gtk::Box::new(gtk::Orientation::Vertical, 0);
        piece.add_css_class("cake-layer");
        piece.add_css_class(layer.css_class());
        piece.set_halign(gtk::Align::Center);
        cake.append(&piece);
        layers.push((layer, piece.upcast::<gtk::Widget>()));
    }

    let wishes = gtk::Label::new(Some(&state.borrow().config.wishes));
    wishes.add_css_class("cake-wishes");
    wishes.add_css_class("title-3");
    wishes.set_wrap(true);
    wishes.set_justify(gtk::Justification::Center);
    wishes.set_max_width_chars(40);
    wishes.set_margin_top(24);

    content.append(&message);
    content.append(&cake);
    content.append(&wishes);

    let sparkle_layer = gtk::Fixed::new();
    sparkle_layer.set_can_target(false);
    sparkle_layer.add_css_class("cake-sparkle-layer");

    overlay.set_child(Some(&content));
    overlay.add_overlay(&sparkle_layer);
    root.append(&overlay);

    {
        let mut st = state.borrow_mut();
        st.cake_widgets.message = Some(message);
        st.cake_widgets.layers = layers;
        st.cake_widgets.wishes = Some(wishes);
        st.cake_widgets.sparkle_layer = Some(sparkle_layer);
    }
    root
}

fn celebrate_cake(state: &Rc<RefCell<AppState>>) {
    celebrate(state, &BurstConfig::cake_opening());
    play_timeline(state, cake_buildup(), apply_cake_cue);
}

fn apply_cake_cue(state: &Rc<RefCell<AppState>>, cue: CakeCue) {
    let st = state.borrow();
    match cue {
        CakeCue::ShowMessage => {
            if let Some(message) = &st.cake_widgets.message {
                message.add_css_class("shown");
            }
        }
        CakeCue::Layer { layer, duration_ms } => {
            tracing::debug!(?layer, duration_ms, "cake layer");
            if let Some((_, widget)) = st.cake_widgets.layers.iter().find(|(l, _)| *l == layer) {
                widget.add_css_class("built");
            }
        }
        CakeCue::Sparkles => {
            let flame = st
                .cake_widgets
                .layers
                .iter()
                .find(|(l, _)| *l == CakeLayer::Flame)
                .map(|(_, w)| w.clone());
            if let (Some(layer), Some(flame)) = (&st.cake_widgets.sparkle_layer, flame) {
                let center = graphene::Point::new(flame.width() as f32 / 2.0, flame.height() as f32 / 2.0);
                if let Some(point) = flame.compute_point(layer, &center) {
                    spawn_sparkles(layer, point.x() as f64, point.y() as f64);
                }
            }
        }
        CakeCue::Finale => {
            if let Some(wishes) = &st.cake_widgets.wishes {
                wishes.add_css_class("shown");
            }
            drop(st);
            launch_confetti(state, confetti_launch());
        }
    }
}
