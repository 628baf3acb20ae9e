//! Core library for the `pingreport` CLI.
//!
//! This crate provides the building blocks used by the binary: target and
//! probe types, address resolution, the bounded probe scheduler, report
//! aggregation, and the event-log, console and chart sinks. The primary
//! user-facing interface is the `pingreport` command-line application.
pub mod args;
pub mod charts;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod report;
pub mod sinks;
