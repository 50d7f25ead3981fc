#![deny(warnings)]

pub mod align;
pub mod audio;
pub mod config;
pub mod features;
pub mod intonation;
pub mod model;
pub mod pipeline;
pub mod pitch;
pub mod pronounce;
pub mod report;
pub mod stress;
pub mod transcribe;
pub mod util;
