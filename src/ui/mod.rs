pub mod app;
pub mod input;
pub mod message;
pub mod screen;
pub mod search;
pub mod tui;
