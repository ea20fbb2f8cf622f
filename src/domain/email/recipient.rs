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

//! Module related to the recipients of the email.
//!
//! This module contains the sources the recipient list can be built
//! from: the developers declared by a project, or an explicit list of
//! addresses.

use log::{debug, warn};
use serde::Deserialize;

use crate::email::{parse_addrs, parse_addrs_with_display_name, EmailAddress, Error, Result};

/// Represents something able to supply the recipients of the email,
/// in order. Duplicates are kept.
pub trait RecipientSource {
    fn recipients(&self, charset: &str) -> Result<Vec<EmailAddress>>;
}

/// Represents a developer declared by a project.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
pub struct Developer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Represents the developers of a project, in declaration order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Developers(pub Vec<Developer>);

impl RecipientSource for Developers {
    /// Collects the addresses of every developer. The name of the
    /// developer becomes the display name of their addresses. A
    /// developer without email is skipped with a warning.
    fn recipients(&self, charset: &str) -> Result<Vec<EmailAddress>> {
        let mut recipients = Vec::with_capacity(self.0.len());

        for dev in self.0.iter() {
            let email = match dev.email.as_deref().map(str::trim) {
                Some(email) if !email.is_empty() => email,
                _ => {
                    warn!("no email defined for developer {}, skipping it", dev.id);
                    continue;
                }
            };

            let addrs = parse_addrs_with_display_name(email, dev.name.as_deref(), charset)
                .map_err(|err| Error::ParseDeveloperEmailError(Box::new(err), dev.id.to_owned()))?;
            recipients.extend(addrs);
        }

        debug!("developer recipients: {:?}", recipients);
        Ok(recipients)
    }
}

/// Represents an explicit list of raw addresses. Each entry may hold
/// several comma-separated addresses.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AddressList(pub Vec<String>);

impl<S: ToString> FromIterator<S> for AddressList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|addr| addr.to_string()).collect())
    }
}

impl RecipientSource for AddressList {
    fn recipients(&self, _charset: &str) -> Result<Vec<EmailAddress>> {
        let mut recipients = Vec::with_capacity(self.0.len());

        for raw in self.0.iter() {
            let addrs = parse_addrs(raw)
                .map_err(|err| Error::ParseRecipientError(Box::new(err), raw.to_owned()))?;
            recipients.extend(addrs);
        }

        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(id: &str, email: Option<&str>, name: Option<&str>) -> Developer {
        Developer {
            id: id.into(),
            email: email.map(Into::into),
            name: name.map(Into::into),
        }
    }

    #[test]
    fn test_developers() {
        let devs = Developers(vec![
            dev("id0", Some("dev0@localhost"), Some("Zero")),
            dev("id1", None, Some("Nobody")),
            dev("id2", Some("  "), None),
            dev("id3", Some("dev3@localhost, dev3@example.org"), None),
        ]);
        let recipients = devs.recipients("UTF-8").unwrap();

        assert_eq!(
            vec![
                "Zero <dev0@localhost>",
                "dev3@localhost",
                "dev3@example.org"
            ],
            recipients.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_developers() {
        assert!(Developers::default().recipients("UTF-8").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_developer_email() {
        let devs = Developers(vec![dev("id0", Some("dev0"), None)]);
        assert!(matches!(
            devs.recipients("UTF-8"),
            Err(Error::ParseDeveloperEmailError(_, id)) if id == "id0"
        ));
    }

    #[test]
    fn test_address_list() {
        let to: AddressList = ["a@localhost", "b@localhost, a@localhost"].into_iter().collect();
        let recipients = to.recipients("UTF-8").unwrap();

        assert_eq!(
            vec!["a@localhost", "b@localhost", "a@localhost"],
            recipients.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_invalid_address_list() {
        let to: AddressList = ["a@localhost", "@localhost"].into_iter().collect();
        assert!(matches!(
            to.recipients("UTF-8"),
            Err(Error::ParseRecipientError(_, raw)) if raw == "@localhost"
        ));
    }
}
