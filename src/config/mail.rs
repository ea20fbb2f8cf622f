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

//! Mail config module.
//!
//! This module contains the representation of the options driving a
//! single notification email.

use serde::Deserialize;

use crate::SmtpConfig;

pub const DEFAULT_CHARSET: &str = "UTF-8";
pub const DEFAULT_SUBJECT: &str = "Automatic Email";

/// Represents the configuration of a notification email.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Disables sending mails.
    pub skip: bool,
    /// Represents the address to send the email from, for example
    /// `john.doe@example.com` or `John Doe <john.doe@example.com>`.
    /// Defaults to `{user}@{hostname}`.
    pub from: Option<String>,
    /// Represents the SMTP server to send the email through.
    pub smtp: SmtpConfig,
    /// Represents the number of days after which the email expires.
    /// `0` disables expiration.
    pub expires: Option<String>,
    /// Represents the charset of the subject and the body.
    pub charset: String,
    /// Represents the priority of the email (`low`, `normal`,
    /// `high`, or any equivalent header value).
    pub priority: Option<String>,
    /// Makes composition and sending errors abort the caller.
    pub fail_on_error: bool,
    /// Represents the topic prefixed to the subject as `[topic]`. An
    /// empty topic is the same as no topic.
    pub topic: Option<String>,
    /// Represents the subject of the email.
    pub subject: String,
    /// Logs the composed email instead of sending it.
    pub dry_run: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            skip: false,
            from: None,
            smtp: SmtpConfig::default(),
            expires: None,
            charset: DEFAULT_CHARSET.into(),
            priority: None,
            fail_on_error: true,
            topic: None,
            subject: DEFAULT_SUBJECT.into(),
            dry_run: false,
        }
    }
}
