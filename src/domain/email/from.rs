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

//! Module related to the sender of the email.

use log::{debug, trace};

use crate::{
    email::{parse_addrs, EmailAddress, Error, Parsed, Result, Warning},
    LocalHost,
};

/// Resolves the sender from the configured `from`. An empty `from`
/// gives the default sender `{user}@{hostname}`. An invalid `from`
/// gives the default sender with a warning. Only the first of
/// multiple senders is kept, with a warning.
///
/// Fails only when the default sender itself cannot be parsed.
pub fn resolve_sender(from: Option<&str>, host: &LocalHost) -> Result<Parsed<EmailAddress>> {
    trace!(">> resolve sender from {:?}", from);

    let from = match from.map(str::trim) {
        Some(from) if !from.is_empty() => from,
        _ => return default_sender(host).map(Parsed::Valid),
    };

    let sender = match parse_addrs(from) {
        Ok(addrs) => {
            let mut addrs = addrs.into_iter();
            match (addrs.next(), addrs.next()) {
                (None, _) => Parsed::Defaulted(
                    default_sender(host)?,
                    Warning::EmptySenderWarning(from.to_owned()),
                ),
                (Some(first), None) => Parsed::Valid(first),
                (Some(first), Some(_)) => {
                    Parsed::Defaulted(first, Warning::MultipleSendersWarning(from.to_owned()))
                }
            }
        }
        Err(err) => {
            debug!("{:?}", err);
            Parsed::Defaulted(
                default_sender(host)?,
                Warning::InvalidSenderWarning(from.to_owned(), err.to_string()),
            )
        }
    };

    trace!("<< resolve sender: {:?}", sender);
    Ok(sender)
}

fn default_sender(host: &LocalHost) -> Result<EmailAddress> {
    let from = host.default_sender();
    parse_addrs(&from)
        .map_err(|err| Error::ParseDefaultSenderError(Box::new(err), from.to_owned()))?
        .into_iter()
        .next()
        .ok_or(Error::DefaultSenderNotFoundError(from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> LocalHost {
        LocalHost::new("builder", "ci.localhost", "10.0.0.1")
    }

    #[test]
    fn test_default_sender() {
        let sender = resolve_sender(None, &host()).unwrap();
        assert_eq!(Parsed::Valid(parse_addrs("builder@ci.localhost").unwrap()[0].clone()), sender);

        let sender = resolve_sender(Some("  "), &host()).unwrap();
        assert_eq!("builder@ci.localhost", sender.value().to_string());
    }

    #[test]
    fn test_configured_sender() {
        let sender = resolve_sender(Some("Builder <from@localhost>"), &host()).unwrap();
        assert_eq!(None, sender.warning());
        assert_eq!("from@localhost", sender.value().mailbox().to_string());
        assert_eq!(Some("Builder"), sender.value().display_name());
    }

    #[test]
    fn test_invalid_sender_falls_back_to_default() {
        let sender = resolve_sender(Some("not-an-address"), &host()).unwrap();
        assert!(matches!(
            sender.warning(),
            Some(Warning::InvalidSenderWarning(from, _)) if from == "not-an-address"
        ));
        assert_eq!("builder@ci.localhost", sender.value().to_string());
    }

    #[test]
    fn test_multiple_senders_keeps_first() {
        let sender = resolve_sender(Some("a@localhost, b@localhost"), &host()).unwrap();
        assert!(matches!(
            sender.warning(),
            Some(Warning::MultipleSendersWarning(_))
        ));
        assert_eq!("a@localhost", sender.value().to_string());
    }

    #[test]
    fn test_invalid_default_sender() {
        let host = LocalHost::new("", "ci.localhost", "10.0.0.1");
        assert!(resolve_sender(None, &host).is_err());
        assert!(resolve_sender(Some("not-an-address"), &host).is_err());
    }
}
