//! # DSP Building Blocks
//!
//! - **`timing`**: converts the time and fade knobs from milliseconds into
//!   clamped sample counts.
//!
//! - **`chunk_buffer`**: the four fixed-size buffers (record and playback
//!   for two ping-pong slots) and the time-reversing copy between them.
//!
//! - **`crossfade`**: linear gain ramps that soften the seams where one
//!   reversed chunk ends and the next begins.
//!
//! - **`reverse_delay`**: the engine that ties them together: cursors,
//!   the record/playback state machine, and the per-sample loop.

pub mod chunk_buffer;
pub mod crossfade;
pub mod reverse_delay;
pub mod timing;
