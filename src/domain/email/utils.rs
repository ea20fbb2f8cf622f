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

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone};
use encoding_rs::{Encoding, UTF_8};
use std::{borrow::Cow, fmt::Display, ops::RangeInclusive};

/// Line separator of composed bodies.
pub const LF: &str = "\r\n";
/// Maximum length of a body line before it gets folded.
pub const LINE_LENGTH: usize = 76;
pub const SIGNATURE_DELIM: &str = "-- ";
/// Maximum length of an RFC 2047 encoded word.
pub const ENCODED_WORD_LENGTH: usize = 75;

/// Formats a date the RFC 2822 way, independently from the locale:
/// `Www, D Mon YYYY hh:mm:ss +ZZZZ`.
pub fn format_mail_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%a, %-d %b %Y %H:%M:%S %z").to_string()
}

fn encoding(charset: &str) -> Option<&'static Encoding> {
    Encoding::for_label(charset.trim().as_bytes())
}

/// Represents an IANA charset that WHATWG labels alias to one of its
/// Windows supersets. Bytes in `excluded` only exist in the superset.
struct Subset {
    name: &'static str,
    labels: &'static [&'static str],
    excluded: RangeInclusive<u8>,
}

static SUBSETS: [Subset; 3] = [
    Subset {
        name: "US-ASCII",
        labels: &["us-ascii", "ascii", "ansi_x3.4-1968", "iso646-us", "us", "csascii"],
        excluded: 0x80..=0xFF,
    },
    Subset {
        name: "ISO-8859-1",
        labels: &[
            "iso-8859-1",
            "iso8859-1",
            "iso88591",
            "iso_8859-1",
            "iso_8859-1:1987",
            "iso-ir-100",
            "latin1",
            "l1",
            "cp819",
            "ibm819",
            "csisolatin1",
        ],
        excluded: 0x80..=0x9F,
    },
    Subset {
        name: "ISO-8859-9",
        labels: &[
            "iso-8859-9",
            "iso8859-9",
            "iso88599",
            "iso_8859-9",
            "iso_8859-9:1989",
            "iso-ir-148",
            "latin5",
            "l5",
            "csisolatin5",
        ],
        excluded: 0x80..=0x9F,
    },
];

fn subset(charset: &str) -> Option<&'static Subset> {
    let charset = charset.trim();
    SUBSETS
        .iter()
        .find(|subset| subset.labels.iter().any(|l| l.eq_ignore_ascii_case(charset)))
}

/// Returns the MIME name of the given charset, or the charset itself
/// if it is unknown.
pub fn mime_charset(charset: &str) -> String {
    if let Some(subset) = subset(charset) {
        return subset.name.to_owned();
    }

    encoding(charset)
        .map(|enc| enc.output_encoding().name().to_owned())
        .unwrap_or_else(|| charset.to_owned())
}

/// Checks that the given text can be represented in the charset. An
/// unknown charset cannot represent anything.
pub fn can_encode(text: &str, charset: &str) -> bool {
    let (bytes, _, unmappable) = match encoding(charset) {
        Some(enc) => enc.encode(text),
        None => return false,
    };

    match subset(charset) {
        _ if unmappable => false,
        Some(subset) => !bytes.iter().any(|b| subset.excluded.contains(b)),
        None => true,
    }
}

/// Encodes the text into the charset, using UTF-8 when the charset is
/// unknown.
pub fn encode<'a>(text: &'a str, charset: &str) -> Cow<'a, [u8]> {
    encoding(charset).unwrap_or(UTF_8).encode(text).0
}

/// Decodes bytes from the charset, sniffing a BOM first and using
/// UTF-8 when the charset is unknown.
pub fn decode(bytes: &[u8], charset: &str) -> String {
    encoding(charset)
        .unwrap_or(UTF_8)
        .decode(bytes)
        .0
        .into_owned()
}

/// Encodes the text as RFC 2047 `B` encoded words of the charset, or
/// of UTF-8 when the charset cannot represent the text. Words are
/// separated by a folding whitespace.
pub fn encode_words(text: &str, charset: &str) -> String {
    let charset = if can_encode(text, charset) {
        mime_charset(charset)
    } else {
        UTF_8.name().to_owned()
    };

    // each group of 3 bytes takes 4 base64 chars
    let max_bytes = (ENCODED_WORD_LENGTH.saturating_sub(charset.len() + 7) / 4 * 3).max(3);
    let encoded_word = |bytes: &[u8]| format!("=?{}?B?{}?=", charset, STANDARD.encode(bytes));

    let mut words = Vec::new();
    let mut word = Vec::new();
    let mut buf = [0; 4];
    for c in text.chars() {
        let bytes = encode(c.encode_utf8(&mut buf), &charset);
        if !word.is_empty() && word.len() + bytes.len() > max_bytes {
            words.push(encoded_word(&word));
            word.clear();
        }
        word.extend_from_slice(&bytes);
    }
    if !word.is_empty() {
        words.push(encoded_word(&word));
    }

    words.join("\r\n ")
}

/// Folds every line of the text so that it fits [`LINE_LENGTH`].
/// Lines are cut before a whitespace, which starts the continuation
/// line. Lines are joined with [`LF`], trailing whitespace of the
/// whole text is removed.
pub fn fold(text: &str) -> String {
    text.trim_end()
        .split('\n')
        .map(|line| fold_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect::<Vec<_>>()
        .join(LF)
}

fn fold_line(line: &str) -> String {
    let is_space = |c: char| c == ' ' || c == '\t';
    let mut folded = String::with_capacity(line.len());
    let mut rest = line;

    while rest.chars().count() > LINE_LENGTH {
        let limit = rest
            .char_indices()
            .nth(LINE_LENGTH)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        // words longer than a line are cut at the next whitespace
        let cut = rest[..limit]
            .rfind(is_space)
            .filter(|&i| i > 0)
            .or_else(|| rest[limit..].find(is_space).map(|i| i + limit));

        match cut {
            Some(i) => {
                folded.push_str(&rest[..i]);
                folded.push_str(LF);
                rest = &rest[i..];
            }
            None => break,
        }
    }

    folded.push_str(rest);
    folded
}
