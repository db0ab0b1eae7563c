pub mod render;
pub mod service;
pub mod ui_interface;
