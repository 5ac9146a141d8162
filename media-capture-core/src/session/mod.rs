pub mod audio_pipeline;
pub mod audio_session;
pub mod video_pipeline;
