pub mod debug;
pub mod memory;
pub mod popup;
