pub mod sender;
pub use sender::{Error, Result, Sender, SenderBuilder};

#[cfg(feature = "smtp-sender")]
pub mod smtp;
#[cfg(feature = "smtp-sender")]
pub use smtp::Smtp;
