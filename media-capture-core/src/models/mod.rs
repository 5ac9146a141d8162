pub mod audio_models;
pub mod config;
pub mod error;
pub mod state;
pub mod video_models;
