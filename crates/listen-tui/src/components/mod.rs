pub mod log_panel;
pub mod now_playing_pane;
pub mod playlist_pane;
pub mod transport_bar;
