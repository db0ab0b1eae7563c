pub mod play_opts;
pub mod playback_config;
pub mod race_data;
pub mod race_request;
