use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;
use log::debug;

use super::assets::{fetch_catalog_then_start, load_artwork};
use super::board::{CONTENT_MARGIN, rebuild_board, redraw_tile, style_tile};
use super::debug_tools;
use super::dialogs::{show_about_dialog, show_difficulty_dialog, show_instructions_dialog};
use super::hud::{set_power_up_available, show_message, update_stats, update_subtitle};
use super::state::AppState;
use crate::config::Settings;
use crate::engine::{Difficulty, GameEvent};

const APP_ID: &str = "io.basshift.Flipmatch";
const STYLE_CSS: &str = include_str!("../../data/style.css");

/// Brings the session clock up to date, renders everything the session has
/// reported and re-arms the single wakeup for its next scheduled task.
pub(super) fn pump(state: &Rc<RefCell<AppState>>) {
    let events = {
        let mut st = state.borrow_mut();
        let now = st.now_ms();
        st.session.advance_to(now);
        st.session.drain_events()
    };

    for event in events {
        apply_event(state, event);
    }

    arm_wakeup(state);
}

fn arm_wakeup(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    if let Some(handle) = st.wakeup_handle.take() {
        handle.remove();
    }
    let Some(delay) = st.session.next_wakeup() else {
        return;
    };
    let state_wake = state.clone();
    let handle = glib::timeout_add_local_once(delay, move || {
        state_wake.borrow_mut().wakeup_handle = None;
        pump(&state_wake);
    });
    st.wakeup_handle = Some(handle);
}

fn apply_event(state: &Rc<RefCell<AppState>>, event: GameEvent) {
    match event {
        GameEvent::BoardLayout { pair_count } => {
            rebuild_board(state, pair_count);
        }
        GameEvent::TileStateChanged { tile_id, state: tile_state } => {
            let st = state.borrow();
            if let Some(button) = st.button_for(&tile_id) {
                style_tile(button, tile_state);
            }
        }
        GameEvent::TileImageSettled { tile_id } => {
            let st = state.borrow();
            if let Some(button) = st.button_for(&tile_id) {
                redraw_tile(button);
            }
        }
        GameEvent::StatsChanged {
            clicks,
            pairs_matched,
            pairs_left,
            time_left,
        } => {
            update_stats(&state.borrow(), clicks, pairs_matched, pairs_left, time_left);
        }
        GameEvent::PowerUpAvailability { available } => {
            set_power_up_available(&state.borrow(), available);
        }
        GameEvent::Message { text, kind } => {
            show_message(&state.borrow(), &text, kind);
        }
        GameEvent::LoadAsset { token, image_ref } => {
            load_artwork(state, token, image_ref);
        }
        GameEvent::Ended { reason } => {
            let st = state.borrow();
            debug!("board ended: {reason:?}");
            if let Some(container) = &st.board_container {
                container.add_css_class("board-ended");
            }
            update_subtitle(&st);
        }
    }
}

/// Runs `f` against the session at the current time, then renders.
fn with_session<R>(
    state: &Rc<RefCell<AppState>>,
    f: impl FnOnce(&mut crate::engine::Session) -> R,
) -> R {
    let result = {
        let mut st = state.borrow_mut();
        let now = st.now_ms();
        st.session.advance_to(now);
        f(&mut st.session)
    };
    pump(state);
    result
}

pub fn handle_tile_click(state: &Rc<RefCell<AppState>>, tile_id: &str) {
    let outcome = with_session(state, |session| session.select_tile(tile_id));
    debug!("click on {tile_id}: {outcome:?}");
}

/// Starts a game, downloading a configured remote catalog first if it has
/// not been cached yet.
pub(super) fn start_game(state: &Rc<RefCell<AppState>>, difficulty: Difficulty) {
    let pending_uri = {
        let st = state.borrow();
        if st.session.catalog().is_cached() {
            None
        } else {
            st.catalog_uri.clone()
        }
    };
    match pending_uri {
        Some(uri) => fetch_catalog_then_start(state, uri, difficulty),
        None => start_game_now(state, difficulty),
    }
}

pub(super) fn start_game_now(state: &Rc<RefCell<AppState>>, difficulty: Difficulty) {
    // A failed start is reported through the session's message event.
    let _ = with_session(state, |session| session.start(difficulty));
}

pub(super) fn reset_game(state: &Rc<RefCell<AppState>>) {
    let difficulty = state.borrow().session.difficulty();
    start_game(state, difficulty);
}

fn activate_power_up(state: &Rc<RefCell<AppState>>) {
    let outcome = with_session(state, |session| session.activate_power_up());
    debug!("reveal: {outcome:?}");
}

fn toggle_theme() {
    let style_manager = adw::StyleManager::default();
    let scheme = if style_manager.is_dark() {
        adw::ColorScheme::ForceLight
    } else {
        adw::ColorScheme::ForceDark
    };
    style_manager.set_color_scheme(scheme);
}

pub fn run() -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let settings = Settings::load();
        let default_difficulty = settings.default_difficulty;
        let state = Rc::new(RefCell::new(AppState::new(&settings)));

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

        let new_game_action = SimpleAction::new("new-game", None);
        new_game_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| show_difficulty_dialog(&state, &app)
        });
        app.add_action(&new_game_action);
        app.set_accels_for_action("app.new-game", &["<Control>n"]);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);
        app.set_accels_for_action("app.quit", &["<Control>q"]);

        let title_game_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_game_box.set_valign(gtk::Align::Center);
        title_game_box.set_halign(gtk::Align::Center);

        let title_game_main = gtk::Label::builder()
            .label("Flipmatch")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();
        let title_game_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();
        title_game_box.append(&title_game_main);
        title_game_box.append(&title_game_subtitle);

        let header = adw::HeaderBar::builder()
            .title_widget(&title_game_box)
            .build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let restart_button = gtk::Button::builder()
            .icon_name("view-refresh-symbolic")
            .build();
        restart_button.set_tooltip_text(Some("Restart"));
        restart_button.connect_clicked({
            let state = state.clone();
            move |_| reset_game(&state)
        });

        let reveal_button = gtk::Button::builder()
            .icon_name("view-reveal-symbolic")
            .sensitive(false)
            .build();
        reveal_button.set_tooltip_text(Some("Reveal all tiles (once per game)"));
        reveal_button.connect_clicked({
            let state = state.clone();
            move |_| activate_power_up(&state)
        });

        header.pack_start(&restart_button);
        header.pack_start(&reveal_button);

        let theme_button = gtk::Button::builder()
            .icon_name("weather-clear-night-symbolic")
            .build();
        theme_button.set_tooltip_text(Some("Toggle dark style"));
        theme_button.connect_clicked(|_| toggle_theme());

        let menu_model = gio::Menu::new();
        menu_model.append(Some("New Game"), Some("app.new-game"));
        menu_model.append(Some("Instructions"), Some("app.instructions"));
        menu_model.append(Some("About Flipmatch"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&theme_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let game_view = build_game_view(&state);
        let toast_overlay = adw::ToastOverlay::new();
        toast_overlay.set_child(Some(&game_view));

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&toast_overlay));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Flipmatch")
            .icon_name(APP_ID)
            .default_width(860)
            .default_height(680)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        {
            let mut st = state.borrow_mut();
            st.toast_overlay = Some(toast_overlay);
            st.title_game_subtitle = Some(title_game_subtitle);
            st.reveal_button = Some(reveal_button);
        }

        let global_key = gtk::EventControllerKey::new();
        global_key.set_propagation_phase(gtk::PropagationPhase::Capture);
        global_key.connect_key_pressed({
            let state = state.clone();
            move |_, key, _, mods| {
                if debug_tools::handle_debug_shortcut(&state, key, mods) {
                    return glib::Propagation::Stop;
                }
                glib::Propagation::Proceed
            }
        });
        win.add_controller(global_key);

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                let mut st = state.borrow_mut();
                if let Some(handle) = st.wakeup_handle.take() {
                    handle.remove();
                }
                glib::Propagation::Proceed
            }
        });

        win.present();
        start_game(&state, default_difficulty);
    });

    app.run()
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

fn stat_label(css_class: &str) -> gtk::Label {
    gtk::Label::builder()
        .label("")
        .css_classes(vec!["hud-stat", css_class])
        .hexpand(true)
        .build()
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("game-root");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_hexpand(true);
    content.set_vexpand(true);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);

    let hud = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    hud.add_css_class("hud");
    let clicks_label = stat_label("hud-clicks");
    let pairs_label = stat_label("hud-pairs");
    let time_label = stat_label("hud-time");
    hud.append(&clicks_label);
    hud.append(&pairs_label);
    hud.append(&time_label);
    content.append(&hud);

    let board_frame = gtk::AspectFrame::new(0.5, 0.5, 1.0, false);
    board_frame.set_halign(gtk::Align::Fill);
    board_frame.set_valign(gtk::Align::Fill);
    board_frame.set_hexpand(true);
    board_frame.set_vexpand(true);

    let board_card = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_card.set_halign(gtk::Align::Fill);
    board_card.set_valign(gtk::Align::Fill);
    board_card.set_hexpand(true);
    board_card.set_vexpand(true);
    board_card.add_css_class("flipmatch-card-container");

    board_card.connect_closure(
        "notify::width",
        false,
        glib::closure_local!(move |card: gtk::Box, _: glib::ParamSpec| {
            if card.width() < 500 {
                card.add_css_class("compact");
            } else {
                card.remove_css_class("compact");
            }
        }),
    );

    board_frame.set_child(Some(&board_card));
    content.append(&board_frame);
    root.append(&content);

    {
        let mut st = state.borrow_mut();
        st.board_container = Some(board_card);
        st.clicks_label = Some(clicks_label);
        st.pairs_label = Some(pairs_label);
        st.time_label = Some(time_label);
        update_subtitle(&st);
    }

    root
}
