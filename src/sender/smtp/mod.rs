pub mod smtp;
pub use smtp::{Error, Result, Smtp};
