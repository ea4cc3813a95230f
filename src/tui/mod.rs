mod app;
pub mod content_view;
pub mod input;
pub mod keys;
pub mod list_view;
pub mod orchestrator;
pub mod overlay;
pub mod render;
pub mod session;
pub mod text;

pub use app::App;
pub use session::Session;
