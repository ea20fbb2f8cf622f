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

//! SMTP module.
//!
//! This module contains the representation of the SMTP email sender.

use lettre::{
    transport::smtp::{
        client::{Tls, TlsParameters},
        SmtpTransport,
    },
    Transport,
};
use log::debug;
use std::result;
use thiserror::Error;

use crate::{sender, OutgoingMessage, Sender, SmtpConfig, SmtpConfigError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build smtp transport relay")]
    BuildTransportRelayError(#[source] lettre::transport::smtp::Error),
    #[error("cannot build smtp tls parameters")]
    BuildTlsParamsError(#[source] lettre::transport::smtp::Error),
    #[error("cannot send email")]
    SendError(#[source] lettre::transport::smtp::Error),

    #[error(transparent)]
    SmtpConfigError(#[from] SmtpConfigError),
}

pub type Result<T> = result::Result<T, Error>;

pub struct Smtp<'a> {
    config: &'a SmtpConfig,
    transport: Option<SmtpTransport>,
}

impl<'a> Smtp<'a> {
    pub fn new(config: &'a SmtpConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        debug!(
            "building smtp transport for {}:{}",
            self.config.host, self.config.port
        );

        let builder = if self.config.ssl() {
            let tls = TlsParameters::builder(self.config.host.to_owned())
                .dangerous_accept_invalid_hostnames(self.config.insecure())
                .dangerous_accept_invalid_certs(self.config.insecure())
                .build()
                .map_err(Error::BuildTlsParamsError)?;

            if self.config.starttls() {
                SmtpTransport::starttls_relay(&self.config.host)
                    .map_err(Error::BuildTransportRelayError)?
                    .tls(Tls::Required(tls))
            } else {
                SmtpTransport::relay(&self.config.host)
                    .map_err(Error::BuildTransportRelayError)?
                    .tls(Tls::Wrapper(tls))
            }
        } else {
            SmtpTransport::relay(&self.config.host)
                .map_err(Error::BuildTransportRelayError)?
                .tls(Tls::None)
        };

        let builder = builder.port(self.config.port);
        let builder = match self.config.credentials()? {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };

        Ok(builder.build())
    }

    fn transport(&mut self) -> Result<&SmtpTransport> {
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => self.build_transport()?,
        };
        Ok(self.transport.insert(transport))
    }
}

impl<'a> Sender for Smtp<'a> {
    fn send(&mut self, email: &OutgoingMessage) -> sender::Result<Vec<u8>> {
        let sendable = email.to_sendable()?;
        let raw_email = sendable.formatted();

        let response = self
            .transport()?
            .send(&sendable)
            .map_err(Error::SendError)?;
        debug!("smtp server response: {:?}", response);

        Ok(raw_email)
    }
}
