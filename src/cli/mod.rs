pub mod render;
pub mod setup;
pub mod ui;

pub use render::{OutputFormat, render};
