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

use chrono::{DateTime, Local};
use lettre::message::{header::ContentType, SinglePart};
use log::{trace, warn};
use std::{env, io, path::PathBuf, result, time::SystemTime};
use thiserror::Error;

use crate::{
    email::{
        add_sendable_headers, addrs_to_string, encode, encode_words, fold, format_mail_date,
        mime_charset, Bulk, EmailAddress, EncodedFromHeader, EncodedSubjectHeader,
        EncodedToHeader, Expiration, Headers, MailHeader, Priority, LF, SIGNATURE_DELIM,
    },
    LocalHost, PRODUCT,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot parse address {1:?}")]
    ParseAddressError(#[source] mailparse::MailParseError, String),
    #[error("cannot parse mailbox {1:?}")]
    InvalidMailboxError(#[source] lettre::address::AddressError, String),
    #[error("cannot parse email of developer {1}")]
    ParseDeveloperEmailError(#[source] Box<Error>, String),
    #[error("email address {1:?} is invalid")]
    ParseRecipientError(#[source] Box<Error>, String),
    #[error("cannot parse default sender address {1:?}")]
    ParseDefaultSenderError(#[source] Box<Error>, String),
    #[error("cannot find default sender address in {0:?}")]
    DefaultSenderNotFoundError(String),

    #[error("cannot find email body: neither text nor text file given")]
    MissingBodyError,
    #[error("cannot expand body file path {1}")]
    ExpandBodyFilePathError(#[source] shellexpand::LookupError<env::VarError>, String),
    #[error("cannot read body file {1:?}")]
    ReadBodyFileError(#[source] io::Error, PathBuf),

    #[error("cannot build sendable email")]
    BuildSendableMsgError(#[source] lettre::error::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the raw parts the email is composed from.
#[derive(Debug, Clone)]
pub struct Draft<'a> {
    pub recipients: Vec<EmailAddress>,
    pub sender: EmailAddress,
    pub subject: &'a str,
    /// Prefixes the subject as `[topic]`, unless empty.
    pub topic: Option<&'a str>,
    pub body: &'a str,
    pub priority: Priority,
    pub expiration: Expiration,
    pub charset: &'a str,
    pub sent_at: DateTime<Local>,
}

/// Represents the fully composed notification email.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutgoingMessage {
    pub sender: EmailAddress,
    pub recipients: Vec<EmailAddress>,
    pub subject: String,
    pub body: String,
    pub headers: Headers,
    /// MIME name of the charset of the subject and the body.
    pub charset: String,
    pub sent_at: DateTime<Local>,
}

/// Composes the email: prefixes the subject with the topic, folds
/// the body and appends the signature, then adds the bulk, priority
/// and expiration headers.
pub fn compose(draft: Draft, host: &LocalHost) -> OutgoingMessage {
    trace!(">> compose email");

    let subject = match draft.topic {
        Some(topic) if !topic.is_empty() => format!("[{}] {}", topic, draft.subject),
        _ => draft.subject.to_owned(),
    };

    let mut body = fold(draft.body);
    body.push_str(LF);
    body.push_str(LF);
    body.push_str(&signature(host));

    let mut headers = Headers::default();
    Bulk.add_headers(&mut headers);
    draft.expiration.add_headers(&mut headers);
    draft.priority.add_headers(&mut headers);

    let email = OutgoingMessage {
        sender: draft.sender,
        recipients: draft.recipients,
        subject,
        body,
        headers,
        charset: mime_charset(draft.charset),
        sent_at: draft.sent_at,
    };

    trace!("<< compose email: {:?}", email);
    email
}

/// Builds the signature block appended to every email.
pub fn signature(host: &LocalHost) -> String {
    let sig = format!(
        "Sent via {} from {} on {} ({})",
        PRODUCT, host.user, host.hostname, host.ip
    );
    format!("{}{}{}", SIGNATURE_DELIM, LF, fold(&sig))
}

impl OutgoingMessage {
    pub fn recipients_to_string(&self) -> String {
        addrs_to_string(&self.recipients)
    }

    /// Transforms the email into a readable string: headers, a blank
    /// line, then the body.
    pub fn to_readable(&self) -> String {
        let mut readable = String::new();

        readable.push_str(&format!("From: {}\n", self.sender));
        readable.push_str(&format!("To: {}\n", self.recipients_to_string()));
        readable.push_str(&format!("Subject: {}\n", self.subject));
        readable.push_str(&format!("Date: {}\n", format_mail_date(&self.sent_at)));
        readable.push_str(&format!(
            "Content-Type: text/plain; charset={}\n",
            self.charset
        ));
        for (key, val) in self.headers.iter() {
            readable.push_str(&format!("{}: {}\n", key, val));
        }

        readable.push('\n');
        readable.push_str(&self.body);
        readable
    }

    /// Builds the email [`lettre`] can send. The subject, the display
    /// names and the body are encoded using the charset.
    pub fn to_sendable(&self) -> Result<lettre::Message> {
        let mut builder = lettre::Message::builder()
            .from(self.sender.to_mailbox())
            .subject(self.subject.to_owned())
            .date(SystemTime::from(self.sent_at));

        for addr in self.recipients.iter() {
            builder = builder.to(addr.to_mailbox());
        }

        // lettre encodes non-ASCII values as UTF-8 only
        if !self.subject.is_ascii() {
            let encoded = encode_words(&self.subject, &self.charset);
            builder = builder.header(EncodedSubjectHeader::new(self.subject.clone(), encoded));
        }

        if self.sender.needs_encoding() {
            builder = builder.header(EncodedFromHeader::new(
                self.sender.mailbox().to_string(),
                self.sender.to_encoded_string(&self.charset),
            ));
        }

        if self.recipients.iter().any(EmailAddress::needs_encoding) {
            let raw = self.recipients.iter().map(|addr| addr.mailbox().to_string());
            let encoded = self
                .recipients
                .iter()
                .map(|addr| addr.to_encoded_string(&self.charset));
            builder = builder.header(EncodedToHeader::new(
                raw.collect::<Vec<_>>().join(", "),
                encoded.collect::<Vec<_>>().join(", "),
            ));
        }

        builder = add_sendable_headers(builder, &self.headers);

        let content_type = format!("text/plain; charset={}", self.charset);
        let content_type = ContentType::parse(&content_type).unwrap_or_else(|err| {
            warn!("cannot use content type {:?}, using text/plain", content_type);
            warn!("{}", err);
            ContentType::TEXT_PLAIN
        });

        builder
            .singlepart(
                SinglePart::builder()
                    .header(content_type)
                    .body(encode(&self.body, &self.charset).into_owned()),
            )
            .map_err(Error::BuildSendableMsgError)
    }
}
