//! Buzzerbeater detection and classification.
//!
//! `period` finds where periods end, `window` decides whether a clock is at
//! the buzzer, `geometry` turns chart pixels into feet, `outcome` judges
//! whether the play flipped the standing, and `extractor` ties them
//! together into [`record::BuzzerbeaterRecord`] values.

pub mod extractor;
pub mod geometry;
pub mod outcome;
pub mod period;
pub mod record;
pub mod window;
