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

//! Module related to auxiliary email headers.
//!
//! This module contains the three header groups added to every
//! notification email: bulk, priority and expiration.

use chrono::{DateTime, Duration, Local};
use lettre::message::{
    header::{Header, HeaderName, HeaderValue},
    MessageBuilder,
};
use log::{trace, warn};
use std::{error::Error as StdError, result};

use crate::email::{format_mail_date, Parsed, Warning};

pub const PRECEDENCE: &str = "Precedence";
pub const X_AUTO_RESPONSE_SUPPRESS: &str = "X-Auto-Response-Suppress";
pub const IMPORTANCE: &str = "Importance";
pub const PRIORITY: &str = "Priority";
pub const X_PRIORITY: &str = "X-Priority";
/// Expiration date as used in Usenet (RFC 1036), superseding
/// `Expiry-Date` according to RFC 2076.
pub const EXPIRES: &str = "Expires";
/// Expiration date as suggested by RFC 1327, understood by Outlook.
pub const EXPIRY_DATE: &str = "Expiry-Date";

/// Represents a list of headers. Keys may repeat.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn push<K: ToString, V: ToString>(&mut self, key: K, val: V) {
        self.0.push((key.to_string(), val.to_string()))
    }

    /// Gets the first value of the given header, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Represents a group of headers that can be added to an email.
pub trait MailHeader {
    fn add_headers(&self, headers: &mut Headers);
}

/// Represents the headers flagging automatic emails, suppressing
/// out-of-office replies.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Bulk;

impl MailHeader for Bulk {
    fn add_headers(&self, headers: &mut Headers) {
        headers.push(PRECEDENCE, "bulk");
        headers.push(X_AUTO_RESPONSE_SUPPRESS, "OOF");
    }
}

/// Represents the priority of the email.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Priority {
    /// Informal emails.
    #[default]
    Low,
    Normal,
    /// Might be chosen when bugs occur.
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];

    /// Value of the `Importance` header.
    pub fn importance(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Value of the `Priority` header.
    pub fn priority(&self) -> &'static str {
        match self {
            Self::Low => "Non-Urgent",
            Self::Normal => "Normal",
            Self::High => "Urgent",
        }
    }

    /// Value of the `X-Priority` header.
    pub fn x_priority(&self) -> &'static str {
        match self {
            Self::Low => "5",
            Self::Normal => "3",
            Self::High => "1",
        }
    }

    fn matches(&self, arg: &str) -> bool {
        [self.importance(), self.priority(), self.x_priority()]
            .iter()
            .any(|val| val.eq_ignore_ascii_case(arg))
    }

    /// Parses the priority from any of its three header values,
    /// case-insensitively. Empty input gives [`Priority::Low`],
    /// unknown input gives [`Priority::Low`] with a warning.
    pub fn parse(arg: Option<&str>) -> Parsed<Self> {
        let arg = match arg.map(str::trim) {
            Some(arg) if !arg.is_empty() => arg,
            _ => return Parsed::Valid(Self::default()),
        };

        match Self::ALL.into_iter().find(|prio| prio.matches(arg)) {
            Some(prio) => Parsed::Valid(prio),
            None => Parsed::Defaulted(
                Self::default(),
                Warning::UnknownPriorityWarning(arg.to_owned()),
            ),
        }
    }
}

impl MailHeader for Priority {
    fn add_headers(&self, headers: &mut Headers) {
        headers.push(IMPORTANCE, self.importance());
        headers.push(PRIORITY, self.priority());
        headers.push(X_PRIORITY, self.x_priority());
    }
}

/// Represents the expiration of the email.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum Expiration {
    /// The email never expires, no header is added.
    #[default]
    None,
    ExpiresOn(DateTime<Local>),
}

impl Expiration {
    pub const DEFAULT_DAYS: u32 = 1;

    pub fn in_days(days: u32, now: &DateTime<Local>) -> Option<Self> {
        if days == 0 {
            return Some(Self::None);
        }
        now.checked_add_signed(Duration::days(days.into()))
            .map(Self::ExpiresOn)
    }

    /// Parses the expiration argument as a number of days from
    /// `now`. Empty input gives the default of one day, `0` disables
    /// expiration, negative or non-numeric input gives the default
    /// with a warning.
    pub fn parse(arg: Option<&str>, now: &DateTime<Local>) -> Parsed<Self> {
        let default = || Self::in_days(Self::DEFAULT_DAYS, now).unwrap_or_default();

        let arg = match arg.map(str::trim) {
            Some(arg) if !arg.is_empty() => arg,
            _ => return Parsed::Valid(default()),
        };

        let days = match arg.parse::<i64>() {
            Ok(days) if days < 0 => {
                return Parsed::Defaulted(default(), Warning::NegativeExpirationWarning(days))
            }
            Ok(days) => days,
            Err(_) => {
                return Parsed::Defaulted(
                    default(),
                    Warning::NonNumericExpirationWarning(arg.to_owned()),
                )
            }
        };

        match u32::try_from(days)
            .ok()
            .and_then(|days| Self::in_days(days, now))
        {
            Some(expiration) => Parsed::Valid(expiration),
            None => Parsed::Defaulted(
                default(),
                Warning::ExpirationOutOfRangeWarning(arg.to_owned()),
            ),
        }
    }
}

impl MailHeader for Expiration {
    fn add_headers(&self, headers: &mut Headers) {
        if let Self::ExpiresOn(date) = self {
            let date = format_mail_date(date);
            headers.push(EXPIRES, &date);
            headers.push(EXPIRY_DATE, &date);
        }
    }
}

macro_rules! aux_header {
    ($type_name:ident, $header_name:expr) => {
        #[derive(Debug, Clone, Eq, PartialEq)]
        struct $type_name(String);

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header_name)
            }

            fn parse(s: &str) -> result::Result<Self, Box<dyn StdError + Send + Sync>> {
                Ok(Self(s.into()))
            }

            fn display(&self) -> HeaderValue {
                HeaderValue::new(Self::name(), self.0.clone())
            }
        }
    };
}

aux_header!(PrecedenceHeader, PRECEDENCE);
aux_header!(XAutoResponseSuppressHeader, X_AUTO_RESPONSE_SUPPRESS);
aux_header!(ImportanceHeader, IMPORTANCE);
aux_header!(PriorityHeader, PRIORITY);
aux_header!(XPriorityHeader, X_PRIORITY);
aux_header!(ExpiresHeader, EXPIRES);
aux_header!(ExpiryDateHeader, EXPIRY_DATE);

macro_rules! encoded_header {
    ($type_name:ident, $header_name:expr) => {
        /// Header written as already encoded. Its raw value is the one
        /// [`lettre`] parses back.
        #[derive(Debug, Clone, Eq, PartialEq)]
        pub(crate) struct $type_name {
            raw: String,
            encoded: String,
        }

        impl $type_name {
            pub(crate) fn new(raw: String, encoded: String) -> Self {
                Self { raw, encoded }
            }
        }

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header_name)
            }

            fn parse(s: &str) -> result::Result<Self, Box<dyn StdError + Send + Sync>> {
                Ok(Self::new(s.into(), s.into()))
            }

            fn display(&self) -> HeaderValue {
                HeaderValue::dangerous_new_pre_encoded(
                    Self::name(),
                    self.raw.clone(),
                    self.encoded.clone(),
                )
            }
        }
    };
}

encoded_header!(EncodedSubjectHeader, "Subject");
encoded_header!(EncodedFromHeader, "From");
encoded_header!(EncodedToHeader, "To");

/// Adds the auxiliary headers to the sendable message. A header that
/// cannot be written is skipped with a warning, the others are still
/// added.
pub(crate) fn add_sendable_headers(
    mut builder: MessageBuilder,
    headers: &Headers,
) -> MessageBuilder {
    for (key, val) in headers.iter() {
        trace!("adding header {}: {}", key, val);
        let val = val.to_owned();

        builder = match key.to_lowercase().as_str() {
            "precedence" => builder.header(PrecedenceHeader(val)),
            "x-auto-response-suppress" => builder.header(XAutoResponseSuppressHeader(val)),
            "importance" => builder.header(ImportanceHeader(val)),
            "priority" => builder.header(PriorityHeader(val)),
            "x-priority" => builder.header(XPriorityHeader(val)),
            "expires" => builder.header(ExpiresHeader(val)),
            "expiry-date" => builder.header(ExpiryDateHeader(val)),
            _ => {
                warn!("cannot add header {:?} to email, skipping it", key);
                builder
            }
        };
    }

    builder
}
