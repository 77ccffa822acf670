//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Safe views over the structs the server hands to every callback
mod arg;
mod arg_list;
mod config;
mod sql_types;

pub use arg::SqlArg;
pub use arg_list::{ArgList, Iter};
pub use config::UdfCfg;
pub use sql_types::{SqlResult, SqlType, SqlTypeError};

pub(crate) mod sealed {
    pub trait Sealed {
        const ACCEPTS_COERCIONS: bool;
    }
}

/// Typestate of a view: which callback it was handed to
pub trait UdfState: sealed::Sealed + core::fmt::Debug {}

/// Marker for views handed to `init`, where settings and coercions can still change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Init;

/// Marker for views handed to `process`, `add`, `clear` and `remove`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Process;

impl sealed::Sealed for Init {
    const ACCEPTS_COERCIONS: bool = true;
}
impl sealed::Sealed for Process {
    const ACCEPTS_COERCIONS: bool = false;
}
impl UdfState for Init {}
impl UdfState for Process {}

/// Returned from `process` to make the result `NULL` and set the server's error flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("udf processing failed")]
pub struct ProcessError;
