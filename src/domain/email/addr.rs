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

//! Module related to email addresses.
//!
//! This module regroups the email address entity and the parsers
//! turning raw comma-separated strings into addresses.

use lettre::{message::Mailbox, Address};
use log::{trace, warn};
use mailparse::{MailAddr, SingleInfo};
use std::fmt;

use crate::email::{can_encode, encode_words, Error, Result};

/// Represents a single, validated email address.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EmailAddress {
    mailbox: Address,
    display_name: Option<String>,
}

impl EmailAddress {
    pub fn new(mailbox: Address, display_name: Option<String>) -> Self {
        Self {
            mailbox,
            display_name: display_name.filter(|name| !name.trim().is_empty()),
        }
    }

    /// Returns the `user@host` part of the address.
    pub fn mailbox(&self) -> &Address {
        &self.mailbox
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn to_mailbox(&self) -> Mailbox {
        Mailbox::new(self.display_name.clone(), self.mailbox.clone())
    }

    /// Checks if the display name needs to be encoded to fit a header.
    pub fn needs_encoding(&self) -> bool {
        self.display_name().map_or(false, |name| !name.is_ascii())
    }

    /// Writes the address the way it appears in a header. A non-ASCII
    /// display name is encoded using the charset.
    pub fn to_encoded_string(&self, charset: &str) -> String {
        match self.display_name() {
            Some(name) if self.needs_encoding() => {
                format!("{} <{}>", encode_words(name, charset), self.mailbox)
            }
            _ => self.to_mailbox().to_string(),
        }
    }

    fn try_from_single_info(info: SingleInfo) -> Result<Self> {
        let mailbox = info
            .addr
            .parse()
            .map_err(|err| Error::InvalidMailboxError(err, info.addr.to_owned()))?;
        Ok(Self::new(mailbox, info.display_name))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_mailbox())
    }
}

/// Joins addresses the way they appear in a `To` header.
pub fn addrs_to_string(addrs: &[EmailAddress]) -> String {
    addrs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses zero or more comma-separated RFC822 addresses. Groups are
/// flattened. Fails on the first invalid address, without returning
/// the ones parsed before.
pub fn parse_addrs<S: AsRef<str>>(raw: S) -> Result<Vec<EmailAddress>> {
    let raw = raw.as_ref();
    trace!("parsing addresses {:?}", raw);

    let addrs =
        mailparse::addrparse(raw).map_err(|err| Error::ParseAddressError(err, raw.to_owned()))?;

    let mut parsed_addrs = Vec::with_capacity(addrs.len());
    for addr in addrs.iter().cloned() {
        match addr {
            MailAddr::Single(info) => parsed_addrs.push(EmailAddress::try_from_single_info(info)?),
            MailAddr::Group(group) => {
                for info in group.addrs {
                    parsed_addrs.push(EmailAddress::try_from_single_info(info)?)
                }
            }
        }
    }

    trace!("parsed addresses: {:?}", parsed_addrs);
    Ok(parsed_addrs)
}

/// Parses addresses like [`parse_addrs`], then applies the given
/// display name to every one of them. A display name that cannot be
/// represented in the charset is dropped with a warning.
pub fn parse_addrs_with_display_name<S: AsRef<str>>(
    raw: S,
    display_name: Option<&str>,
    charset: &str,
) -> Result<Vec<EmailAddress>> {
    let addrs = parse_addrs(raw)?;

    let display_name = match display_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Ok(addrs),
    };

    Ok(addrs
        .into_iter()
        .map(|addr| {
            if can_encode(display_name, charset) {
                EmailAddress::new(addr.mailbox, Some(display_name.to_owned()))
            } else {
                warn!(
                    "cannot encode display name {:?} of {} using charset {}, omitting it",
                    display_name, addr.mailbox, charset
                );
                EmailAddress::new(addr.mailbox, None)
            }
        })
        .collect())
}
