//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `lookup6`: resolve a host name to an IPv6 address
//!
//! IPv4 results are returned as IPv4-mapped IPv6 addresses. Names that do not resolve give
//! `NULL`.
//!
//! ```sql
//! SELECT lookup6('localhost');  -- '::1'
//! SELECT lookup6('0.0.0.0');    -- '::ffff:0.0.0.0'
//! ```
use std::net::{IpAddr, Ipv6Addr, SocketAddr, ToSocketAddrs};

use udf::prelude::*;

/// Longest textual IPv6 address
const IPV6_MAX_LEN: u32 = 39;

#[derive(Debug)]
struct Lookup6;

/// Prefer an IPv6 address, fall back to the first one found
fn resolve(host: &str) -> Option<Ipv6Addr> {
    let addrs: Vec<SocketAddr> = (host, 0).to_socket_addrs().ok()?.collect();
    let addr = addrs.iter().find(|a| a.is_ipv6()).or_else(|| addrs.first())?;
    Some(match addr.ip() {
        IpAddr::V4(v4) => v4.to_ipv6_mapped(),
        IpAddr::V6(v6) => v6,
    })
}

#[register]
impl BasicUdf for Lookup6 {
    type Returns<'a> = Option<String>;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 1 {
            return Err(format!("expected 1 argument; got {}", args.len()));
        }
        let Some(arg) = args.get(0) else {
            return Err("expected 1 argument; got 0".to_owned());
        };
        if !arg.value().is_string() {
            return Err(format!("expected string argument; got {}", arg.value().display_name()));
        }

        cfg.set_max_len(IPV6_MAX_LEN);
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        let Some(host) = args.get(0).and_then(|a| a.value().as_string()) else {
            return Ok(None);
        };
        Ok(resolve(host).map(|ip| ip.to_string()))
    }
}
