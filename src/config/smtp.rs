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

//! SMTP config module.
//!
//! This module contains the representation of the SMTP server the
//! notification email is sent through.

use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use serde::Deserialize;
use thiserror::Error;

use crate::process;

pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 25;

#[derive(Debug, Error)]
pub enum SmtpConfigError {
    #[error("cannot get smtp password")]
    GetPasswdError(#[source] process::Error),
    #[error("cannot get smtp password: password is empty")]
    GetPasswdEmptyError,
}

/// Represents the SMTP sender config.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Represents the SMTP server host.
    pub host: String,
    /// Represents the SMTP server port.
    pub port: u16,
    /// Enables TLS.
    pub ssl: Option<bool>,
    /// Enables StartTLS.
    pub starttls: Option<bool>,
    /// Trusts any certificate.
    pub insecure: Option<bool>,
    /// Represents the SMTP server login. No authentication happens
    /// without it.
    pub login: Option<String>,
    /// Represents the SMTP password command.
    pub passwd_cmd: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.into(),
            port: DEFAULT_SMTP_PORT,
            ssl: None,
            starttls: None,
            insecure: None,
            login: None,
            passwd_cmd: None,
        }
    }
}

impl SmtpConfig {
    /// Builds the SMTP credentials, if a login is configured.
    pub fn credentials(&self) -> Result<Option<SmtpCredentials>, SmtpConfigError> {
        let login = match self.login.as_deref() {
            Some(login) if !login.trim().is_empty() => login,
            _ => return Ok(None),
        };

        let passwd = match self.passwd_cmd.as_deref() {
            Some(cmd) => process::run(cmd).map_err(SmtpConfigError::GetPasswdError)?,
            None => String::new(),
        };
        let passwd = passwd
            .lines()
            .next()
            .filter(|passwd| !passwd.is_empty())
            .ok_or(SmtpConfigError::GetPasswdEmptyError)?;

        Ok(Some(SmtpCredentials::new(
            login.to_owned(),
            passwd.to_owned(),
        )))
    }

    pub fn ssl(&self) -> bool {
        self.ssl.unwrap_or_default()
    }

    pub fn starttls(&self) -> bool {
        self.starttls.unwrap_or_default()
    }

    pub fn insecure(&self) -> bool {
        self.insecure.unwrap_or_default()
    }
}
