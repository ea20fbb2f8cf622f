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

use log::warn;
use thiserror::Error;

/// Represents a recoverable problem met while parsing an option. A
/// default value has been substituted and processing goes on.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Warning {
    #[error("cannot parse priority {0:?}, using default priority")]
    UnknownPriorityWarning(String),
    #[error("expiration argument {0:?} is not a number, using default expiration")]
    NonNumericExpirationWarning(String),
    #[error("expiration days {0} is negative, using default expiration")]
    NegativeExpirationWarning(i64),
    #[error("expiration days {0} is out of range, using default expiration")]
    ExpirationOutOfRangeWarning(String),
    #[error("cannot parse sender {0:?}, using default address: {1}")]
    InvalidSenderWarning(String, String),
    #[error("cannot find sender in {0:?}, using default address")]
    EmptySenderWarning(String),
    #[error("multiple senders specified, choosing only the first one: {0:?}")]
    MultipleSendersWarning(String),
}

/// Represents the result of a parse-or-default operation: either the
/// value has been parsed as is, or a default value has been chosen
/// and the reason is kept aside.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Parsed<T> {
    Valid(T),
    Defaulted(T, Warning),
}

impl<T> Parsed<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Valid(value) | Self::Defaulted(value, _) => value,
        }
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            Self::Valid(_) => None,
            Self::Defaulted(_, warning) => Some(warning),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Valid(value) | Self::Defaulted(value, _) => value,
        }
    }

    /// Logs the warning, if any, then returns the value.
    pub fn report(self) -> T {
        if let Some(warning) = self.warning() {
            warn!("{}", warning);
        }
        self.into_value()
    }
}
