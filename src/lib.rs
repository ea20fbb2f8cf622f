// notimail-lib, a Rust library for build notification emails.
// Copyright (C) 2022  soywod <clement.douin@posteo.net>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Library for composing and sending a single notification email on
//! behalf of an automated build.
//!
//! The [`Delivery`] orchestrator builds an [`OutgoingMessage`] from
//! a [`MailConfig`], a [`RecipientSource`] and a [`BodySource`], then
//! either logs it (dry run), skips it, or hands it to a [`Sender`].

pub(crate) mod process;

pub mod config;
pub use config::*;

pub mod domain;
pub use domain::*;

pub mod sender;
#[cfg(feature = "smtp-sender")]
pub use sender::Smtp;
pub use sender::{Sender, SenderBuilder};

pub mod delivery;
pub use delivery::{Delivery, DeliveryOutcome};

/// Product name used in the signature and in dry-run reports.
pub const PRODUCT: &str = "notimail";
