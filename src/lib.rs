//! Load WAVE audio files into a structured header and raw sample payload.
//!
//! The [`wave`] module holds the parser itself, [`config`] maps a
//! `config.toml` onto parser options for the command line tool.
pub mod config;
pub mod wave;
