use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("How to Play"),
        Some(
            "Pop the balloons to look for the hidden cake.\n\
You have four pops; the last one always finds it.\n\
Browse the photos, then open your card.",
        ),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Birthday Surprise")
        .application_icon("io.github.birthday.Surprise")
        .version(env!("CARGO_PKG_VERSION"))
        .comments("A little interactive birthday greeting.")
        .build();
    dialog.add_legal_section(
        "Birthday Surprise",
        None,
        gtk::License::MitX11,
        None,
    );
    dialog.present(app.active_window().as_ref());
    dialog
}
