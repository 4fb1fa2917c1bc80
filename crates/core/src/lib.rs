#![forbid(unsafe_code)]

pub mod analytics;
pub mod countdown;
pub mod history;
pub mod model;
pub mod time;

pub use time::Clock;
