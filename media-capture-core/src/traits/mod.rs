pub mod audio_host;
pub mod video_host;
