use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use birthday_surprise::card::{CardCue, Flip};
use birthday_surprise::effects::confetti_launch;

use super::app::{launch_confetti, play_timeline};
use super::gallery::{apply_gallery_cue, sync_gallery_views};
use super::state::AppState;

pub(super) fn build_card(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_halign(gtk::Align::Center);
    root.add_css_class("card-block");

    let (cover, recipient, lines) = {
        let st = state.borrow();
        (
            st.config.card_cover.clone(),
            st.config.recipient.clone(),
            st.config.card_message.clone(),
        )
    };

    let shell = gtk::Overlay::new();
    shell.add_css_class("greeting-card");
    shell.set_size_request(300, 380);

    let inner = gtk::Box::new(gtk::Orientation::Vertical, 10);
    inner.add_css_class("card-inner");
    inner.set_valign(gtk::Align::Center);
    let dear = gtk::Label::new(Some(&format!("Dear {recipient},")));
    dear.add_css_class("title-3");
    inner.append(&dear);
    for line in &lines {
        let label = gtk::Label::new(Some(line));
        label.set_wrap(true);
        label.set_justify(gtk::Justification::Center);
        label.set_max_width_chars(28);
        inner.append(&label);
    }
    inner.set_visible(false);

    let front = gtk::Box::new(gtk::Orientation::Vertical, 8);
    front.add_css_class("card-front");
    front.set_valign(gtk::Align::Fill);
    front.set_halign(gtk::Align::Fill);
    let heart = gtk::Label::new(Some("💌"));
    heart.add_css_class("card-front-icon");
    heart.set_vexpand(true);
    heart.set_valign(gtk::Align::End);
    let cover_label = gtk::Label::new(Some(&cover));
    cover_label.add_css_class("title-2");
    cover_label.set_vexpand(true);
    cover_label.set_valign(gtk::Align::Start);
    front.append(&heart);
    front.append(&cover_label);

    shell.set_child(Some(&inner));
    shell.add_overlay(&front);

    // Clicking anywhere on the card only ever opens it.
    let click = gtk::GestureClick::new();
    click.connect_released({
        let state = state.clone();
        move |_, _, _, _| handle_card_body_click(&state)
    });
    shell.add_controller(click);

    let toggle_button = gtk::Button::with_label("Open Card");
    toggle_button.add_css_class("pill");
    toggle_button.set_halign(gtk::Align::Center);
    toggle_button.connect_clicked({
        let state = state.clone();
        move |_| handle_card_toggle(&state)
    });

    root.append(&shell);
    root.append(&toggle_button);

    {
        let mut st = state.borrow_mut();
        st.card_widgets.shell = Some(shell);
        st.card_widgets.front = Some(front.upcast());
        st.card_widgets.inner = Some(inner.upcast());
        st.card_widgets.toggle_button = Some(toggle_button);
    }
    root
}

fn dismiss_gallery(state: &Rc<RefCell<AppState>>) {
    let lock = state.borrow_mut().gallery.card_clicked();
    sync_gallery_views(state);
    play_timeline(state, lock, apply_gallery_cue);
}

fn handle_card_body_click(state: &Rc<RefCell<AppState>>) {
    dismiss_gallery(state);
    let flip = {
        let mut st = state.borrow_mut();
        let device = st.device;
        st.card.open_from_card(device)
    };
    if let Some(flip) = flip {
        play_flip(state, flip);
    }
}

fn handle_card_toggle(state: &Rc<RefCell<AppState>>) {
    dismiss_gallery(state);
    let flip = {
        let mut st = state.borrow_mut();
        let device = st.device;
        st.card.toggle(device)
    };
    if let Some(flip) = flip {
        play_flip(state, flip);
    }
}

fn play_flip(state: &Rc<RefCell<AppState>>, flip: Flip) {
    {
        let st = state.borrow();
        if let Some(button) = &st.card_widgets.toggle_button {
            button.set_label(if flip.opening { "Close Card" } else { "Open Card" });
        }
        if let Some(shell) = &st.card_widgets.shell {
            if flip.opening {
                shell.add_css_class("open");
            } else {
                shell.remove_css_class("open");
            }
        }
    }
    if flip.celebrate {
        launch_confetti(state, confetti_launch());
    }
    play_timeline(state, flip.cues, apply_card_cue);
}

fn apply_card_cue(state: &Rc<RefCell<AppState>>, cue: CardCue) {
    if cue == CardCue::Settle {
        state.borrow_mut().card.settle();
        return;
    }
    let st = state.borrow();
    let (Some(front), Some(inner)) = (&st.card_widgets.front, &st.card_widgets.inner) else {
        return;
    };
    match cue {
        CardCue::ShowInner => inner.set_visible(true),
        CardCue::RaiseInner => {
            inner.add_css_class("raised");
            front.add_css_class("flipped");
            front.set_can_target(false);
        }
        CardCue::HideFront => front.set_visible(false),
        CardCue::ShowFront => {
            front.set_visible(true);
            front.set_can_target(true);
            front.remove_css_class("flipped");
        }
        CardCue::LowerInner => inner.remove_css_class("raised"),
        CardCue::HideInner => {
            if st.card.should_hide_inner() {
                inner.set_visible(false);
            }
        }
        CardCue::Settle => {}
    }
}
