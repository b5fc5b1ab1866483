//! UI panels: presentation-only widgets that issue store actions.

pub mod icon_bar;
pub mod map_controls;
pub mod panel_trait;
pub mod sidebar;
pub mod toolbox;

pub use icon_bar::IconBar;
pub use map_controls::MapControls;
pub use panel_trait::{Panel, UiState};
pub use sidebar::Sidebar;
pub use toolbox::Toolbox;
