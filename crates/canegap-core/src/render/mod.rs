pub mod config;
pub mod overlay;

pub use config::OverlayConfig;
pub use overlay::render_overlay;
