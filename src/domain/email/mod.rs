//! Email module.
//!
//! This module contains everything needed to compose the
//! notification email: addresses, auxiliary headers, sender
//! resolution, recipient and body sources.

mod addr;
pub use addr::*;

mod warning;
pub use warning::*;

mod header;
pub use header::*;

mod from;
pub use from::*;

mod utils;
pub use utils::*;

mod recipient;
pub use recipient::*;

mod body;
pub use body::*;

mod email;
pub use self::email::*;
