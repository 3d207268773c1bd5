pub mod empty_state;
pub mod pane_chrome;
pub mod selection;
pub mod status_bar;
pub mod text;
pub mod toast;
