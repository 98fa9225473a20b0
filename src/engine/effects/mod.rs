pub mod background;
pub mod overlay;
