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

//! Local host module.
//!
//! This module contains the process-wide values describing where the
//! email is sent from.

use log::{debug, warn};
use std::{env, net::ToSocketAddrs};

pub const FALLBACK_HOSTNAME: &str = "localhost";
pub const FALLBACK_HOST_IP: &str = "127.0.0.1";

/// Represents the local user and machine. Resolved once at startup
/// with [`LocalHost::detect`] and passed down to the resolvers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LocalHost {
    pub user: String,
    pub hostname: String,
    pub ip: String,
}

impl LocalHost {
    pub fn new<U, H, I>(user: U, hostname: H, ip: I) -> Self
    where
        U: ToString,
        H: ToString,
        I: ToString,
    {
        Self {
            user: user.to_string(),
            hostname: hostname.to_string(),
            ip: ip.to_string(),
        }
    }

    /// Detects the current user, the local host name and its ip
    /// address.
    pub fn detect() -> Self {
        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_default();

        let (hostname, ip) = match hostname::get() {
            Ok(hostname) => {
                let hostname = hostname.to_string_lossy().into_owned();
                let ip = (hostname.as_str(), 0)
                    .to_socket_addrs()
                    .ok()
                    .and_then(|mut addrs| addrs.next())
                    .map(|addr| addr.ip().to_string());
                match ip {
                    Some(ip) => (hostname, ip),
                    None => {
                        warn!("cannot resolve ip of host {}, using fallback", hostname);
                        (FALLBACK_HOSTNAME.into(), FALLBACK_HOST_IP.into())
                    }
                }
            }
            Err(err) => {
                warn!("cannot get local host name, using fallback");
                warn!("{}", err);
                (FALLBACK_HOSTNAME.into(), FALLBACK_HOST_IP.into())
            }
        };

        let host = Self { user, hostname, ip };
        debug!("local host: {:?}", host);
        host
    }

    /// Builds the default sender address `{user}@{hostname}`.
    pub fn default_sender(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}
