//! Game clock

mod time;

pub use time::RegenTimer;
