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

//! Sender module.
//!
//! This module contains the sender interface: the transport handing
//! the composed email over to the mail system.

use std::{error, result};
use thiserror::Error;

use crate::{email, MailConfig, OutgoingMessage};

#[cfg(feature = "smtp-sender")]
use crate::sender::smtp::{self, Smtp};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build email sender: sender is not defined")]
    BuildEmailSenderMissingError,
    #[error("cannot send email")]
    SendEmailError(#[source] Box<dyn error::Error + Send + Sync>),

    #[error(transparent)]
    EmailError(#[from] email::Error),
    #[cfg(feature = "smtp-sender")]
    #[error(transparent)]
    SmtpError(#[from] smtp::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents a transport able to send the composed email once.
/// Returns the raw email that has been sent.
pub trait Sender {
    fn send(&mut self, email: &OutgoingMessage) -> Result<Vec<u8>>;
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct SenderBuilder;

impl<'a> SenderBuilder {
    #[cfg(feature = "smtp-sender")]
    pub fn build(config: &'a MailConfig) -> Result<Box<dyn Sender + 'a>> {
        Ok(Box::new(Smtp::new(&config.smtp)))
    }

    #[cfg(not(feature = "smtp-sender"))]
    pub fn build(_config: &'a MailConfig) -> Result<Box<dyn Sender + 'a>> {
        Err(Error::BuildEmailSenderMissingError)
    }
}
