pub mod frame_slot_ring;
pub mod growable_buffer;
pub mod linear_resampler;
pub mod sample_decoder;
pub mod timed_event_queue;
