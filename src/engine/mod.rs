pub mod compositor;
pub mod controls;
pub mod coords;
pub mod drag;
pub mod editor;
pub mod effects;
pub mod input;
pub mod joystick;
pub mod scheduler;
pub mod transform;
