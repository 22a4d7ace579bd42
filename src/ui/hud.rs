use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use birthday_surprise::music::MusicState;
use birthday_surprise::sections::Section;

use super::state::AppState;

fn section_subtitle(st: &AppState) -> String {
    match st.sections.active() {
        Some(Section::Intro) | None => st.config.intro_message.clone(),
        Some(Section::Main) => "Memories & wishes".to_string(),
        Some(Section::Game) => format!("Pops {}", st.game.counter_label()),
        Some(Section::Cake) => "Make a wish!".to_string(),
    }
}

pub(super) fn set_header_for_section(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let Some(subtitle) = &st.title_subtitle {
        subtitle.set_text(&section_subtitle(&st));
    }
}

pub(super) fn update_counter(st: &AppState) {
    let label = st.game.counter_label();
    if let Some(counter) = &st.game_widgets.counter_label {
        counter.set_text(&label);
    }
    if st.sections.is_active(Section::Game) {
        if let Some(subtitle) = &st.title_subtitle {
            subtitle.set_text(&format!("Pops {label}"));
        }
    }
}

pub(super) fn update_music_button(st: &AppState) {
    let Some(button) = &st.music_button else {
        return;
    };
    match st.music.state() {
        MusicState::Unavailable => button.set_visible(false),
        MusicState::Playing => {
            button.set_visible(true);
            button.set_icon_name("audio-volume-high-symbolic");
            button.add_css_class("playing");
        }
        MusicState::Paused => {
            button.set_visible(true);
            button.set_icon_name("audio-volume-muted-symbolic");
            button.remove_css_class("playing");
        }
    }
}

pub(super) fn start_music(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let st = &mut *st;
    st.music.start(&mut st.audio);
    update_music_button(st);
}

pub(super) fn toggle_music(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let st = &mut *st;
    let music_state = st.music.toggle(&mut st.audio);
    tracing::debug!(?music_state, "music toggled");
    update_music_button(st);
}

pub(super) fn handle_media_failure(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let st = &mut *st;
    st.music.media_failed(&mut st.audio);
    update_music_button(st);
}
