//! Database models, one file per table family.

pub mod day_of_week;
pub mod event;
pub mod schedule;

pub use self::day_of_week::*;
pub use self::event::*;
pub use self::schedule::*;
