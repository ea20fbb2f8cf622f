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

//! Delivery module.
//!
//! This module contains the orchestrator deciding whether the
//! notification email is skipped, logged (dry run) or sent, and
//! whether a failure aborts the caller.

use chrono::Local;
use log::{debug, error, info, trace};
use std::{error::Error as StdError, result};
use thiserror::Error;

use crate::{
    compose, email, resolve_sender, sender, BodySource, Draft, Expiration, LocalHost, MailConfig,
    OutgoingMessage, Priority, RecipientSource, Sender, PRODUCT,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot resolve recipients")]
    ResolveRecipientsError(#[source] email::Error),
    #[error("cannot get email body")]
    GetBodyError(#[source] email::Error),
    #[error("cannot resolve sender")]
    ResolveSenderError(#[source] email::Error),
    #[error("cannot send email to {1}")]
    SendEmailError(#[source] sender::Error, String),
}

impl Error {
    /// A fatal error aborts the caller even when `fail_on_error` is
    /// disabled: without sender no email can exist.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResolveSenderError(_))
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Represents how a delivery ended.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Sending is disabled or there is nobody to send the email to.
    Skipped,
    /// The email has been composed and logged, not sent. Holds the
    /// readable email.
    DryRun(String),
    Sent,
    /// The delivery failed but `fail_on_error` is disabled, the
    /// error has been logged.
    Failed(Error),
}

pub struct Delivery<'a> {
    config: &'a MailConfig,
    host: &'a LocalHost,
}

impl<'a> Delivery<'a> {
    pub fn new(config: &'a MailConfig, host: &'a LocalHost) -> Self {
        Self { config, host }
    }

    /// Composes the email, then logs it or sends it using the
    /// sender. Errors are returned only when `fail_on_error` is
    /// enabled, or when the sender cannot be resolved.
    pub fn deliver<R, B>(
        &self,
        recipients: &R,
        body: &B,
        sender: &mut dyn Sender,
    ) -> Result<DeliveryOutcome>
    where
        R: RecipientSource + ?Sized,
        B: BodySource + ?Sized,
    {
        if self.config.skip {
            debug!("email sending disabled, skipping it");
            return Ok(DeliveryOutcome::Skipped);
        }

        match self.try_deliver(recipients, body, sender) {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_fatal() || self.config.fail_on_error => Err(err),
            Err(err) => {
                error!("fail on error disabled, ignoring error: {}", err);
                let mut source = err.source();
                while let Some(cause) = source {
                    error!("caused by: {}", cause);
                    source = cause.source();
                }
                Ok(DeliveryOutcome::Failed(err))
            }
        }
    }

    fn try_deliver<R, B>(
        &self,
        recipients: &R,
        body: &B,
        sender: &mut dyn Sender,
    ) -> Result<DeliveryOutcome>
    where
        R: RecipientSource + ?Sized,
        B: BodySource + ?Sized,
    {
        let email = match self.compose(recipients, body)? {
            Some(email) => email,
            None => return Ok(DeliveryOutcome::Skipped),
        };

        if self.config.dry_run {
            let readable = email.to_readable();
            info!("{} dry run, email:\n{}", PRODUCT, readable);
            return Ok(DeliveryOutcome::DryRun(readable));
        }

        let recipients = email.recipients_to_string();
        debug!("sending email to recipients: {}", recipients);
        sender
            .send(&email)
            .map_err(|err| Error::SendEmailError(err, recipients.to_owned()))?;
        info!("email sent to recipients: {}", recipients);

        Ok(DeliveryOutcome::Sent)
    }

    /// Composes the email out of the config and the sources. Returns
    /// `None` when there is no recipient.
    pub fn compose<R, B>(&self, recipients: &R, body: &B) -> Result<Option<OutgoingMessage>>
    where
        R: RecipientSource + ?Sized,
        B: BodySource + ?Sized,
    {
        trace!(">> compose delivery");
        let charset = self.config.charset.as_str();

        let recipients = recipients
            .recipients(charset)
            .map_err(Error::ResolveRecipientsError)?;
        if recipients.is_empty() {
            debug!("no recipients, skipping email");
            return Ok(None);
        }

        let text = body.text(charset).map_err(Error::GetBodyError)?;

        let sender = resolve_sender(self.config.from.as_deref(), self.host)
            .map_err(Error::ResolveSenderError)?
            .report();

        let sent_at = Local::now();
        let priority = Priority::parse(self.config.priority.as_deref()).report();
        let expiration = Expiration::parse(self.config.expires.as_deref(), &sent_at).report();

        let email = compose(
            Draft {
                recipients,
                sender,
                subject: &self.config.subject,
                topic: self.config.topic.as_deref(),
                body: &text,
                priority,
                expiration,
                charset,
                sent_at,
            },
            self.host,
        );

        trace!("<< compose delivery");
        Ok(Some(email))
    }
}
