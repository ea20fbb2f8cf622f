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

//! Module related to the body of the email.

use log::{trace, warn};
use std::{fs, path::PathBuf};

use crate::email::{decode, Error, Result};

/// Represents something able to supply the plain text body of the
/// email.
pub trait BodySource {
    fn text(&self, charset: &str) -> Result<String>;
}

impl BodySource for str {
    fn text(&self, _charset: &str) -> Result<String> {
        Ok(self.to_owned())
    }
}

impl BodySource for String {
    fn text(&self, _charset: &str) -> Result<String> {
        Ok(self.to_owned())
    }
}

/// Represents the body of the email, given either literally or as a
/// path to a text file.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct MessageBody {
    /// Represents the text of the email.
    pub text: Option<String>,
    /// Represents the file the text of the email is read from. Takes
    /// precedence over `text`. Shell variables are expanded.
    pub text_file: Option<PathBuf>,
}

impl MessageBody {
    pub fn from_text<S: ToString>(text: S) -> Self {
        Self {
            text: Some(text.to_string()),
            text_file: None,
        }
    }

    pub fn from_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            text: None,
            text_file: Some(path.into()),
        }
    }
}

impl BodySource for MessageBody {
    fn text(&self, charset: &str) -> Result<String> {
        match (self.text.as_ref(), self.text_file.as_ref()) {
            (None, None) => Err(Error::MissingBodyError),
            (Some(text), None) => Ok(text.to_owned()),
            (text, Some(path)) => {
                if text.is_some() {
                    warn!("both text and text file given, reading text from {:?}", path);
                }

                let path = path.to_string_lossy();
                let path = shellexpand::full(&path)
                    .map_err(|err| Error::ExpandBodyFilePathError(err, path.to_string()))?;
                let path = PathBuf::from(path.to_string());
                trace!("reading body from {:?}", path);

                let bytes =
                    fs::read(&path).map_err(|err| Error::ReadBodyFileError(err, path.to_owned()))?;
                Ok(decode(&bytes, charset))
            }
        }
    }
}
