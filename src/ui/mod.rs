pub mod app;
mod assets;
mod board;
mod debug_tools;
mod dialogs;
mod hud;
mod state;
