//! Rendering
//!
//! Scene building and HUD text are plain data and run everywhere; the
//! wgpu pipeline draws the scene as one triangle list.

pub mod hud;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use hud::{HudSnapshot, Overlay};
pub use pipeline::RenderState;
pub use scene::{build_scene, clear_color};
