pub mod debug;
pub mod embed;
pub mod memory;
pub mod popup;
