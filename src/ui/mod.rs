mod app;
mod board;
mod card;
mod debug_tools;
mod dialogs;
mod effects;
mod gallery;
mod hud;
mod media;
mod scene;
mod state;

pub use app::run;
