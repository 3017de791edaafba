pub mod desktop;
pub mod dpi;
pub mod input;
