//! Claude Code log reconstruction (ccrec)
//!
//! Rebuilds the contents of files touched during Claude Code sessions from
//! the JSONL session logs alone.
//!
//! The engine is a chain of pure stages: [`parser`] turns lines into entries,
//! [`join`] pairs tool requests with their results, and [`reconstruct`]
//! replays each file's history from its latest complete snapshot.
//! [`integration`] wires the stages together; [`source`], [`config`],
//! [`logging`] and [`report`] form the shell around them.

pub mod config;
pub mod integration;
pub mod join;
pub mod logging;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod report;
pub mod source;
