pub mod embed;
pub mod menu;
pub mod platform;
pub mod window;
