pub mod artist_table;
pub mod count_chart;
pub mod duration_panel;
pub mod help_overlay;
pub mod nav;
pub mod overview;
pub mod track_table;
pub mod view_panel;
