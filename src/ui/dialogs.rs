use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

use super::app::start_game;
use super::state::AppState;
use crate::engine::Difficulty;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("Instructions"),
        Some(
            "Turn over two tiles at a time and find every matching pair before the clock runs out.\n\
Reveal shows the whole board for a moment, once per game.",
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
        .application_name("Flipmatch")
        .application_icon("io.basshift.Flipmatch")
        .developer_name("Basshift")
        .version(env!("CARGO_PKG_VERSION"))
        .comments("A timed tile-matching game.")
        .build();
    dialog.add_legal_section("Flipmatch", None, gtk::License::MitX11, None);
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_difficulty_dialog(state: &Rc<RefCell<AppState>>, app: &adw::Application) {
    let parent_window = app.active_window();
    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);

    let title = gtk::Label::new(Some("Choose difficulty"));
    title.add_css_class("dialog-header-title");
    title.set_halign(gtk::Align::Center);

    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.set_show_end_title_buttons(true);
    header.add_css_class("flat");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.add_css_class("mode-dialog-content");
    content.set_hexpand(true);
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    content.set_margin_start(16);
    content.set_margin_end(16);

    for difficulty in Difficulty::ALL {
        let (pairs, seconds) = difficulty.config();
        let label = format!(
            "{}  ·  {} pairs in {}",
            difficulty.name(),
            pairs,
            crate::engine::format_clock(seconds)
        );
        let button = gtk::Button::with_label(&label);
        button.set_hexpand(true);
        button.set_size_request(-1, 42);
        button.add_css_class("mode-dialog-button");
        button.connect_clicked({
            let state = state.clone();
            let dialog = dialog.clone();
            move |_| {
                dialog.close();
                start_game(&state, difficulty);
            }
        });
        content.append(&button);
    }

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(parent_window.as_ref());
}
