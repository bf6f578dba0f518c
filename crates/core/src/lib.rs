#![deny(warnings)]

pub mod chunk;
pub mod classify;
pub mod config;
pub mod decode;
pub mod merge;
pub mod pipeline;
pub mod util;
