pub mod fs_backend;
pub mod memory_backend;
pub mod metadata;
pub mod resilient_io;
pub mod shared;
pub mod wav_writer;
