use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::gdk::prelude::GdkCairoContextExt;
use gtk4::pango;
use gtk4::prelude::*;

use super::app::handle_tile_click;
use super::state::{AppState, Artwork};
use crate::engine::TileState;

pub const CONTENT_MARGIN: i32 = 12;
pub const TILE_GAP: i32 = 6;

const FALLBACK_GLYPH: &str = "✕";
const LOADING_GLYPH: &str = "…";

fn draw_text(
    area: &gtk::DrawingArea,
    cr: &cairo::Context,
    width: i32,
    height: i32,
    text: &str,
    emoji: bool,
) {
    let min_dim = width.min(height) as f64;
    let font_size = if emoji { min_dim * 0.40 } else { min_dim * 0.34 };

    cr.set_antialias(cairo::Antialias::Best);

    let layout = pangocairo::functions::create_layout(cr);
    let mut font_desc = pango::FontDescription::new();
    if emoji {
        font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
    } else {
        font_desc.set_family("Cantarell, Noto Sans, sans");
        font_desc.set_weight(pango::Weight::Bold);
    }
    font_desc.set_size((font_size * pango::SCALE as f64) as i32);
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    let fg = area.style_context().color();
    cr.set_source_rgba(
        fg.red() as f64,
        fg.green() as f64,
        fg.blue() as f64,
        fg.alpha() as f64,
    );

    let (text_width, text_height) = layout.pixel_size();
    cr.move_to(
        (width as f64 - text_width as f64) / 2.0,
        (height as f64 - text_height as f64) / 2.0,
    );
    pangocairo::functions::show_layout(cr, &layout);
}

fn draw_image(cr: &cairo::Context, width: i32, height: i32, pixbuf: &gtk::gdk_pixbuf::Pixbuf) {
    let (img_w, img_h) = (pixbuf.width() as f64, pixbuf.height() as f64);
    if img_w <= 0.0 || img_h <= 0.0 {
        return;
    }
    let scale = (width as f64 * 0.8 / img_w).min(height as f64 * 0.8 / img_h);
    let x = (width as f64 - img_w * scale) / 2.0;
    let y = (height as f64 - img_h * scale) / 2.0;
    cr.save().ok();
    cr.translate(x, y);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.paint().ok();
    cr.restore().ok();
}

pub(super) fn redraw_tile(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

/// Applies the css classes for `state` to a tile button and redraws it.
pub(super) fn style_tile(button: &gtk::Button, state: TileState) {
    button.remove_css_class("face-up");
    button.remove_css_class("matched");
    match state {
        TileState::FaceDown => {}
        TileState::FaceUp => button.add_css_class("face-up"),
        TileState::Matched => button.add_css_class("matched"),
    }
    redraw_tile(button);
}

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("flipmatch-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let (grid_cols, tiles) = {
        let st = state.borrow();
        let tiles: Vec<(String, TileState)> = st
            .session
            .board()
            .tiles()
            .iter()
            .map(|tile| (tile.tile_id.clone(), tile.state))
            .collect();
        (st.grid_cols.max(1), tiles)
    };

    let mut buttons = Vec::with_capacity(tiles.len());
    for (index, (tile_id, tile_state)) in tiles.into_iter().enumerate() {
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["flipmatch-card"])
            .hexpand(true)
            .vexpand(true)
            .build();

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        drawing_area.add_css_class("flipmatch-card-label");

        let state_draw = state.clone();
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let st = state_draw.borrow();
            let Some(tile) = st.tile_at(index) else {
                return;
            };
            if tile.state == TileState::FaceDown {
                draw_text(area, cr, width, height, "?", false);
                return;
            }
            match st.artwork.get(&tile.image_ref) {
                Some(Artwork::Glyph(glyph)) => draw_text(area, cr, width, height, glyph, true),
                Some(Artwork::Image(pixbuf)) => draw_image(cr, width, height, pixbuf),
                Some(Artwork::Failed) => draw_text(area, cr, width, height, FALLBACK_GLYPH, false),
                None => draw_text(area, cr, width, height, LOADING_GLYPH, false),
            }
        });

        button.set_child(Some(&drawing_area));
        style_tile(&button, tile_state);

        let state_click = state.clone();
        button.connect_clicked(move |_| {
            handle_tile_click(&state_click, &tile_id);
        });

        aspect_frame.set_child(Some(&button));

        let i = index as i32;
        grid.attach(&aspect_frame, i % grid_cols, i / grid_cols, 1, 1);
        buttons.push(button);
    }

    state.borrow_mut().grid_buttons = buttons;
    grid
}

pub(super) fn rebuild_board(state: &Rc<RefCell<AppState>>, pair_count: usize) {
    let board_container = {
        let mut st = state.borrow_mut();
        let (cols, rows) = AppState::layout_for(pair_count);
        st.grid_cols = cols;
        st.grid_rows = rows;
        let tile_index = st
            .session
            .board()
            .tiles()
            .iter()
            .enumerate()
            .map(|(index, tile)| (tile.tile_id.clone(), index))
            .collect();
        st.tile_index = tile_index;
        st.board_container.clone()
    };
    let Some(board_container) = board_container else {
        return;
    };

    while let Some(child) = board_container.first_child() {
        board_container.remove(&child);
    }
    board_container.remove_css_class("board-ended");

    let grid = build_board_grid(state);
    let (grid_cols, grid_rows) = {
        let st = state.borrow();
        (st.grid_cols, st.grid_rows)
    };
    let grid_ratio = if grid_rows > 0 {
        grid_cols as f32 / grid_rows as f32
    } else {
        1.0
    };
    let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
    grid_frame.set_halign(gtk::Align::Fill);
    grid_frame.set_valign(gtk::Align::Fill);
    grid_frame.set_hexpand(true);
    grid_frame.set_vexpand(true);
    grid_frame.set_child(Some(&grid));
    board_container.append(&grid_frame);
}
