pub mod camera;
pub mod canvas;
pub mod config;
pub mod context;
pub mod controls;
pub mod interaction;
pub mod loader;
pub mod markers;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod viewer;
pub use config::ViewerConfig;
pub use context::{ViewContext, ViewerEvent};
pub use interaction::{KeyEvent, PointerEvent, ResizeEvent};
pub use loader::{LoadHandle, ModelLoader, ModelSource};
pub use viewer::{LoadOutcome, Viewer, ViewerError};
