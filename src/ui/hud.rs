use gtk4::prelude::*;
use libadwaita as adw;

use super::state::AppState;
use crate::engine::{EndReason, MessageKind, format_clock};

pub(super) fn update_subtitle(st: &AppState) {
    if let Some(subtitle) = &st.title_game_subtitle {
        let stats = st.session.stats();
        let mode_label = st.session.difficulty().name();
        let text = match stats.outcome {
            Some(EndReason::Win) => format!("{mode_label} | Cleared"),
            Some(EndReason::Timeout) => format!("{mode_label} | Time's up"),
            None if stats.active => {
                format!("{mode_label} | {} pairs", stats.pair_count)
            }
            None => mode_label.to_string(),
        };
        subtitle.set_text(&text);
    }
}

pub(super) fn update_stats(
    st: &AppState,
    clicks: u32,
    pairs_matched: usize,
    pairs_left: usize,
    time_left: u32,
) {
    if let Some(label) = &st.clicks_label {
        label.set_text(&format!("Clicks {clicks}"));
    }
    if let Some(label) = &st.pairs_label {
        label.set_text(&format!("Pairs {pairs_matched} | {pairs_left} left"));
    }
    if let Some(label) = &st.time_label {
        label.set_text(&format_clock(time_left));
        if time_left <= 10 && st.session.is_active() {
            label.add_css_class("time-low");
        } else {
            label.remove_css_class("time-low");
        }
    }
    update_subtitle(st);
}

pub(super) fn set_power_up_available(st: &AppState, available: bool) {
    if let Some(button) = &st.reveal_button {
        button.set_sensitive(available);
    }
}

pub(super) fn show_message(st: &AppState, text: &str, kind: MessageKind) {
    let Some(overlay) = &st.toast_overlay else {
        return;
    };
    let toast = adw::Toast::new(text);
    match kind {
        MessageKind::Info => toast.set_timeout(3),
        MessageKind::Success => toast.set_timeout(6),
        MessageKind::Error => {
            toast.set_timeout(0);
            toast.set_priority(adw::ToastPriority::High);
        }
    }
    overlay.add_toast(toast);
}
