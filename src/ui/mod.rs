//! Toolkit-independent presentation layer.
//!
//! Input parsing, event dispatch and pure views. The terminal runtime in
//! the binary only reads lines, forwards events and prints views.

pub mod app;
pub mod input;
pub mod view;

pub use app::{Action, App, AppOptions};
pub use input::{UiEvent, parse_line};
pub use view::{Screen, View};
