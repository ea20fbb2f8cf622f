pub mod delivery;
pub use delivery::{Delivery, DeliveryOutcome, Error, Result};
