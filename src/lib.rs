pub mod app;
pub mod error;
pub mod generators;
pub mod grid;
pub mod playback;
pub mod solvers;
