//! Rendering module
//!
//! The simulation is flattened into a [`RenderFrame`] each frame; any
//! [`Renderer`] draws from that snapshot alone.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod frame;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use frame::{Hud, RenderFrame, Renderer, Sprite, SpriteKind, TileSprite, VisualState, build_frame};
