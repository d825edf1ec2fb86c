use std::cell::RefCell;
use std::rc::Rc;

use gtk4::gdk;
use log::info;

use super::app::{pump, reset_game};
use super::hud::show_message;
use super::state::AppState;
use crate::config::debug_mode_enabled;
use crate::engine::MessageKind;

const FORCED_TIME_LEFT_SECS: u32 = 5;

pub fn handle_debug_shortcut(
    state: &Rc<RefCell<AppState>>,
    key: gdk::Key,
    mods: gdk::ModifierType,
) -> bool {
    if !mods.contains(gdk::ModifierType::CONTROL_MASK) {
        return false;
    }
    let is_debug_key = matches!(key, gdk::Key::T | gdk::Key::t | gdk::Key::R | gdk::Key::r);
    if !is_debug_key {
        return false;
    }

    if !debug_mode_enabled() {
        show_message(
            &state.borrow(),
            "Debug shortcuts are off | export FLIPMATCH_DEBUG=1",
            MessageKind::Info,
        );
        return true;
    }

    match key {
        gdk::Key::T | gdk::Key::t => {
            {
                let mut st = state.borrow_mut();
                let now = st.now_ms();
                st.session.advance_to(now);
                st.session.force_time_left(FORCED_TIME_LEFT_SECS);
            }
            info!("[debug] time left forced to {FORCED_TIME_LEFT_SECS}s");
            pump(state);
        }
        _ => {
            info!("[debug] restarting current game");
            reset_game(state);
        }
    }
    true
}
