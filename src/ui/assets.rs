use std::cell::RefCell;
use std::rc::Rc;

use gtk4::gdk_pixbuf::Pixbuf;
use gtk4::prelude::*;
use log::{debug, info, warn};

use super::app::{pump, start_game_now};
use super::state::{AppState, Artwork};
use crate::engine::catalog::EMOJI_PREFIX;
use crate::engine::{CatalogCache, CatalogProvider, Difficulty, GameError, Item, JsonCatalog};

/// Catalog document read from a URI through GIO (`file://`, plain paths, and
/// remote schemes where GVfs is available). The download happens in
/// `fetch_catalog_then_start`; this only parses what arrived, or reports why
/// nothing did.
struct FetchedCatalog {
    uri: String,
    document: Result<String, glib::Error>,
}

impl CatalogProvider for FetchedCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Item>, GameError> {
        match &self.document {
            Ok(raw) => JsonCatalog::parse(raw),
            Err(err) => Err(GameError::catalog_with_source(
                format!("fetching {}", self.uri),
                err.clone(),
            )),
        }
    }
}

/// Downloads the catalog at `uri` without blocking the main loop, then starts
/// a `difficulty` game on it. Requests made while a download is in flight
/// only update the difficulty it will start with.
pub(super) fn fetch_catalog_then_start(
    state: &Rc<RefCell<AppState>>,
    uri: String,
    difficulty: Difficulty,
) {
    {
        let mut st = state.borrow_mut();
        let in_flight = st.catalog_fetch.replace(difficulty).is_some();
        if in_flight {
            return;
        }
    }
    info!("fetching catalog {uri}");

    let state = state.clone();
    glib::MainContext::default().spawn_local(async move {
        let file = gio::File::for_commandline_arg(&uri);
        let document = file
            .load_contents_future()
            .await
            .map(|(bytes, _etag)| String::from_utf8_lossy(&bytes).into_owned());
        let difficulty = {
            let mut st = state.borrow_mut();
            st.session
                .set_catalog(CatalogCache::new(Box::new(FetchedCatalog { uri, document })));
            st.catalog_fetch.take()
        };
        // A failed fetch is reported by the start itself and leaves the
        // cache empty, so the next start downloads again.
        if let Some(difficulty) = difficulty {
            start_game_now(&state, difficulty);
        }
    });
}

/// Loads artwork for `image_ref` and reports back to the session of game
/// `token`. Already-loaded artwork settles immediately.
pub(super) fn load_artwork(state: &Rc<RefCell<AppState>>, token: u64, image_ref: String) {
    let cached = state.borrow().artwork.get(&image_ref).cloned();
    if let Some(artwork) = cached {
        settle_later(state, token, image_ref, !matches!(artwork, Artwork::Failed));
        return;
    }

    if let Some(glyph) = image_ref.strip_prefix(EMOJI_PREFIX) {
        let glyph = glyph.to_string();
        state
            .borrow_mut()
            .artwork
            .insert(image_ref.clone(), Artwork::Glyph(glyph));
        settle_later(state, token, image_ref, true);
        return;
    }

    let state = state.clone();
    glib::MainContext::default().spawn_local(async move {
        let artwork = match fetch_pixbuf(&image_ref).await {
            Ok(pixbuf) => {
                debug!("loaded {image_ref}");
                Artwork::Image(pixbuf)
            }
            Err(err) => {
                warn!("could not load {image_ref}: {err}");
                Artwork::Failed
            }
        };
        let ok = !matches!(artwork, Artwork::Failed);
        state.borrow_mut().artwork.insert(image_ref.clone(), artwork);
        settle(&state, token, &image_ref, ok);
    });
}

async fn fetch_pixbuf(image_ref: &str) -> Result<Pixbuf, glib::Error> {
    let file = gio::File::for_commandline_arg(image_ref);
    let (bytes, _etag) = file.load_bytes_future().await?;
    let stream = gio::MemoryInputStream::from_bytes(&bytes);
    Pixbuf::from_stream_future(&stream).await
}

/// Settles from an idle callback so the report never re-enters a running pump.
fn settle_later(state: &Rc<RefCell<AppState>>, token: u64, image_ref: String, ok: bool) {
    let state = state.clone();
    glib::idle_add_local_once(move || settle(&state, token, &image_ref, ok));
}

fn settle(state: &Rc<RefCell<AppState>>, token: u64, image_ref: &str, ok: bool) {
    {
        let mut st = state.borrow_mut();
        let now = st.now_ms();
        st.session.advance_to(now);
        st.session.asset_settled(token, image_ref, ok);
    }
    pump(state);
}
