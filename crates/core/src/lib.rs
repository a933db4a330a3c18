#![forbid(unsafe_code)]

pub mod aggregate;
pub mod model;
pub mod session;
pub mod time;
pub mod timer;
pub mod validator;

pub use time::Clock;
