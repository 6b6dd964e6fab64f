#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod convai;
pub mod display;
pub mod persona;
pub mod session;
