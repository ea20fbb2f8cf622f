pub mod email;
pub use email::{
    compose, format_mail_date, parse_addrs, parse_addrs_with_display_name, resolve_sender, Bulk,
    BodySource, Developer, Developers, Draft, EmailAddress, Expiration, Headers, MailHeader,
    MessageBody, OutgoingMessage, Parsed, Priority, RecipientSource, AddressList, Warning,
};
