pub mod host;
pub use host::LocalHost;

pub mod mail;
pub use mail::*;

pub mod smtp;
pub use smtp::*;
