use std::cell::RefCell;
use std::rc::Rc;
use gtk4::gdk;
use birthday_surprise::sections::Section;
use super::board::start_round;
use super::hud::set_header_for_section;
use super::scene::jump_to_section;
use super::state::AppState;

const BANNER_MS: u64 = 1200;

pub fn debug_mode_enabled() -> bool {
    match std::env::var("BIRTHDAY_DEBUG") {
        Ok(value) => {
            let v = value.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "yes" | "on")
        }
        Err(_) => false,
    }
}

fn section_for_key(key: gdk::Key) -> Option<Section> {
    match key {
        gdk::Key::_1 | gdk::Key::KP_1 => Some(Section::Intro),
        gdk::Key::_2 | gdk::Key::KP_2 => Some(Section::Main),
        gdk::Key::_3 | gdk::Key::KP_3 => Some(Section::Game),
        gdk::Key::_4 | gdk::Key::KP_4 => Some(Section::Cake),
        _ => None,
    }
}

pub fn handle_debug_shortcut(
    state: &Rc<RefCell<AppState>>,
    key: gdk::Key,
    mods: gdk::ModifierType,
) -> bool {
    if !mods.contains(gdk::ModifierType::CONTROL_MASK) {
        return false;
    }

    let restart = matches!(key, gdk::Key::R | gdk::Key::r);
    let target = section_for_key(key);
    if !restart && target.is_none() {
        return false;
    }

    if !debug_mode_enabled() {
        show_debug_banner(state, "DEBUG OFF | export BIRTHDAY_DEBUG=1");
        return true;
    }

    if restart {
        let in_game = state.borrow().sections.is_active(Section::Game);
        if !in_game {
            show_debug_banner(state, "DEBUG | Restart only works in the game");
            return true;
        }
        start_round(state);
        tracing::info!("[debug] balloon round restarted");
        show_debug_banner(state, "DEBUG | Balloons reset");
        return true;
    }

    let Some(target) = target else {
        return false;
    };
    if jump_to_section(state, target) {
        tracing::info!(section = target.name(), "[debug] forced section");
        show_debug_banner(state, &format!("DEBUG | {}", target.name()));
    } else {
        tracing::info!(section = target.name(), "[debug] section jump refused");
        show_debug_banner(state, &format!("DEBUG | {} refused", target.name()));
    }
    true
}

fn show_debug_banner(state: &Rc<RefCell<AppState>>, message: &str) {
    let banner_id = {
        let mut st = state.borrow_mut();
        st.banner_id = st.banner_id.wrapping_add(1);
        if let Some(subtitle) = &st.title_subtitle {
            subtitle.set_text(message);
        }
        st.banner_id
    };
    let state_weak = Rc::downgrade(state);
    glib::timeout_add_local_once(std::time::Duration::from_millis(BANNER_MS), move || {
        if let Some(state) = state_weak.upgrade() {
            let current = state.borrow().banner_id == banner_id;
            if current {
                set_header_for_section(&state);
            }
        }
    });
}
