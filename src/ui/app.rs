use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::prelude::*;
use libadwaita as adw;
use gio::SimpleAction;

use birthday_surprise::balloons::DeviceClass;
use birthday_surprise::config::GreetingConfig;
use birthday_surprise::effects::{BurstConfig, Celebration};
use birthday_surprise::timeline::Timeline;

use super::board::build_game_view;
use super::debug_tools;
use super::dialogs::{show_about_dialog, show_instructions_dialog};
use super::effects::SparkLayer;
use super::gallery::{apply_gallery_cue, build_preview_overlay, build_transition_overlay};
use super::hud::{handle_media_failure, set_header_for_section, toggle_music, update_music_button};
use super::scene::{build_cake_view, build_intro_view, build_main_view, show_initial_section};
use super::state::AppState;

const APP_ID: &str = "io.github.birthday.Surprise";
const STYLE_CSS: &str = include_str!("../../data/style.css");

/// Plays `timeline` on the main loop. Zero-offset cues run immediately, so
/// callers must not hold a borrow of the state.
pub(super) fn play_timeline<E: 'static>(
    state: &Rc<RefCell<AppState>>,
    timeline: Timeline<E>,
    apply: fn(&Rc<RefCell<AppState>>, E),
) {
    for cue in timeline {
        if cue.at.is_zero() {
            apply(state, cue.event);
            continue;
        }
        let state_weak = Rc::downgrade(state);
        let event = cue.event;
        glib::timeout_add_local_once(cue.at, move || {
            if let Some(state) = state_weak.upgrade() {
                apply(&state, event);
            }
        });
    }
}

pub(super) fn celebrate(state: &Rc<RefCell<AppState>>, config: &BurstConfig) {
    if let Some(sparks) = &state.borrow().sparks {
        sparks.burst(config);
    }
}

pub(super) fn launch_confetti(state: &Rc<RefCell<AppState>>, timeline: Timeline<BurstConfig>) {
    if let Some(sparks) = &state.borrow().sparks {
        sparks.launch(timeline);
    }
}

fn detect_device(win: &adw::ApplicationWindow) -> DeviceClass {
    let touch = gdk::Display::default()
        .and_then(|display| display.default_seat())
        .is_some_and(|seat| seat.capabilities().contains(gdk::SeatCapabilities::TOUCH));
    let width = if win.width() > 0 { win.width() } else { win.default_width() };
    DeviceClass::detect(width, touch)
}

pub fn run() {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let config = GreetingConfig::load();
        let state = Rc::new(RefCell::new(AppState::new(config, DeviceClass::Desktop)));

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let (headline, recipient) = {
            let st = state.borrow();
            (st.config.headline.clone(), st.config.recipient.clone())
        };

        let title_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_box.set_valign(gtk::Align::Center);
        title_box.set_halign(gtk::Align::Center);
        let title_main = gtk::Label::builder()
            .label(format!("{headline} {recipient}"))
            .halign(gtk::Align::Center)
            .css_classes(vec!["greeting-title-main"])
            .build();
        let title_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["greeting-title-subtitle", "caption"])
            .build();
        title_box.append(&title_main);
        title_box.append(&title_subtitle);

        let header = adw::HeaderBar::builder().title_widget(&title_box).build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let music_button = gtk::Button::builder()
            .icon_name("audio-volume-muted-symbolic")
            .build();
        music_button.set_tooltip_text(Some("Music"));
        music_button.add_css_class("music-toggle");
        music_button.connect_clicked({
            let state = state.clone();
            move |_| toggle_music(&state)
        });

        let menu_model = gio::Menu::new();
        menu_model.append(Some("How to Play"), Some("app.instructions"));
        menu_model.append(Some("About"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&music_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let sparks = SparkLayer::new();

        // Sections are stacked in one overlay so a fade-out and the next
        // fade-in can overlap on screen.
        let sections_overlay = gtk::Overlay::new();
        sections_overlay.set_hexpand(true);
        sections_overlay.set_vexpand(true);
        let base = gtk::Box::new(gtk::Orientation::Vertical, 0);
        base.add_css_class("greeting-backdrop");
        sections_overlay.set_child(Some(&base));

        let intro_view = build_intro_view(&state);
        let main_view = build_main_view(&state);
        let game_view = build_game_view(&state);
        let cake_view = build_cake_view(&state);
        for view in [&intro_view, &main_view, &game_view, &cake_view] {
            view.add_css_class("section");
            view.set_visible(false);
            sections_overlay.add_overlay(view);
        }

        let preview_overlay = build_preview_overlay(&state);
        sections_overlay.add_overlay(&preview_overlay);
        let transition_overlay = build_transition_overlay(&state);
        sections_overlay.add_overlay(&transition_overlay);
        sections_overlay.add_overlay(sparks.widget());

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&sections_overlay));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title(format!("{headline} {recipient}"))
            .default_width(960)
            .default_height(720)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        {
            let mut st = state.borrow_mut();
            st.device = detect_device(&win);
            st.window = Some(win.clone());
            st.title_subtitle = Some(title_subtitle);
            st.music_button = Some(music_button);
            st.views.intro = Some(intro_view.upcast());
            st.views.main = Some(main_view.upcast());
            st.views.game = Some(game_view.upcast());
            st.views.cake = Some(cake_view.upcast());
            st.sparks = Some(sparks);
            let state_weak = Rc::downgrade(&state);
            st.audio.set_failure_hook(move || {
                if let Some(state) = state_weak.upgrade() {
                    handle_media_failure(&state);
                }
            });
            tracing::info!(device = ?st.device, photos = st.config.photos.len(), "greeting ready");
        }

        win.connect_notify_local(Some("default-width"), {
            let state = state.clone();
            move |win, _| {
                let device = detect_device(win);
                let mut st = state.borrow_mut();
                if st.device != device {
                    tracing::debug!(?device, "device class changed");
                    st.device = device;
                }
            }
        });

        let style_manager = adw::StyleManager::default();
        if style_manager.is_dark() {
            win.add_css_class("theme-dark");
        } else {
            win.add_css_class("theme-light");
        }
        style_manager.connect_notify_local(Some("dark"), {
            let win = win.clone();
            move |manager, _| {
                if manager.is_dark() {
                    win.remove_css_class("theme-light");
                    win.add_css_class("theme-dark");
                } else {
                    win.remove_css_class("theme-dark");
                    win.add_css_class("theme-light");
                }
            }
        });

        let global_key = gtk::EventControllerKey::new();
        global_key.set_propagation_phase(gtk::PropagationPhase::Capture);
        global_key.connect_key_pressed({
            let state = state.clone();
            move |_, key, _, mods| {
                if debug_tools::handle_debug_shortcut(&state, key, mods) {
                    return glib::Propagation::Stop;
                }
                if key == gdk::Key::Escape {
                    let timeline = state.borrow_mut().gallery.escape();
                    if let Some(timeline) = timeline {
                        play_timeline(&state, timeline, apply_gallery_cue);
                        return glib::Propagation::Stop;
                    }
                }
                glib::Propagation::Proceed
            }
        });
        win.add_controller(global_key);

        let motion = gtk::EventControllerMotion::new();
        motion.connect_motion({
            let state = state.clone();
            move |_, x, y| {
                let origin = {
                    let mut st = state.borrow_mut();
                    let active = st.sections.active();
                    if !st.trail.should_emit(Instant::now(), active) {
                        return;
                    }
                    let Some(win) = &st.window else {
                        return;
                    };
                    let (w, h) = (win.width() as f64, win.height() as f64);
                    if w <= 0.0 || h <= 0.0 {
                        return;
                    }
                    (x / w, y / h)
                };
                celebrate(&state, &BurstConfig::trail(origin));
            }
        });
        sections_overlay.add_controller(motion);

        show_initial_section(&state);
        set_header_for_section(&state);
        update_music_button(&state.borrow());
        win.present();
    });

    app.run();
}

fn load_css() {
    let Some(display) = gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(STYLE_CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
