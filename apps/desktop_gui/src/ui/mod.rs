//! UI layer for the desktop GUI: the egui app shell and its chat surface.

pub mod app;
pub mod surface;

pub use app::ChatApp;
