//! Buzzerbeater detection and reporting for BuzzerBeater match timelines.
//!
//! A match timeline is scanned for made scores inside the five seconds
//! before each period boundary. Each hit becomes a [`BuzzerbeaterRecord`]
//! that can be stored, filtered, rendered as text and aggregated.
//!
//! [`BuzzerbeaterRecord`]: detection::record::BuzzerbeaterRecord

pub mod config;
pub mod db;
pub mod detection;
pub mod monitoring;
pub mod report;
pub mod timeline;
