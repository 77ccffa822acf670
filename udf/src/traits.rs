//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! The traits a function implements
use std::num::NonZeroU8;

use crate::types::{ArgList, Init, Process, ProcessError, UdfCfg};

/// A scalar (non-aggregate) function
///
/// The server calls `xxx_init` once per statement, `xxx` once per row and `xxx_deinit` once
/// at the end. Here that becomes [`BasicUdf::init`] constructing `Self`, [`BasicUdf::process`]
/// borrowing it mutably, and `Drop`.
pub trait BasicUdf: Sized {
    /// What `process` returns
    ///
    /// `i64` and `f64` become SQL integers and reals. Anything that is `AsRef<[u8]>`
    /// (`String`, `Vec<u8>`, `&'a str`, `&'a [u8]`, ...) becomes a SQL string. Wrap any of
    /// them in `Option` if the function can return `NULL`.
    ///
    /// Borrowed returns must borrow from `self`, which outlives the call.
    type Returns<'a>
    where
        Self: 'a;

    /// Check the arguments and build the function's state
    ///
    /// Everything about the call that is known up front can be checked here: argument count,
    /// types, constness. Types can be fixed with [`SqlArg::set_type_coercion`], and the result
    /// described with the setters on [`UdfCfg<Init>`].
    ///
    /// # Errors
    ///
    /// The `String` is shown to the user as is. It is truncated to
    /// [`MYSQL_ERRMSG_SIZE`](crate::MYSQL_ERRMSG_SIZE) - 1 bytes. The server suggests keeping
    /// it under 80 characters.
    ///
    /// [`SqlArg::set_type_coercion`]: crate::SqlArg::set_type_coercion
    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String>;

    /// Produce the value for one row (or, for aggregates, one group)
    ///
    /// `error` is set if a previous `add` for this group failed.
    ///
    /// # Errors
    ///
    /// A [`ProcessError`] makes the result `NULL` and flags the error to the server. For
    /// aggregates the rest of the group is skipped.
    fn process<'a>(
        &'a mut self,
        cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError>;
}

/// An aggregate function
///
/// Per group the server calls `clear`, then `add` for every row, then `process` once.
///
/// `#[register]` on this impl must repeat the `name` and `alias`es given on the [`BasicUdf`]
/// impl:
///
/// ```no_run
/// # use udf::prelude::*;
/// struct Total(i64);
///
/// #[register(name = "total", alias = "sum_all")]
/// impl BasicUdf for Total {
///     type Returns<'a> = i64;
///
///     fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
///         Ok(Self(0))
///     }
///
///     fn process<'a>(
///         &'a mut self,
///         _cfg: &UdfCfg<Process>,
///         _args: &ArgList<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<Self::Returns<'a>, ProcessError> {
///         Ok(self.0)
///     }
/// }
///
/// #[register(name = "total", alias = "sum_all")]
/// impl AggregateUdf for Total {
///     fn clear(
///         &mut self,
///         _cfg: &UdfCfg<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<(), NonZeroU8> {
///         self.0 = 0;
///         Ok(())
///     }
///
///     fn add(
///         &mut self,
///         _cfg: &UdfCfg<Process>,
///         args: &ArgList<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<(), NonZeroU8> {
///         self.0 += args.iter().filter_map(|a| a.value().as_int()).sum::<i64>();
///         Ok(())
///     }
/// }
/// # fn main() {}
/// ```
///
/// Anything else is a compile error:
///
/// ```compile_fail
/// # use udf::prelude::*;
/// struct Total(i64);
///
/// #[register(name = "total", alias = "sum_all")]
/// impl BasicUdf for Total {
///     type Returns<'a> = i64;
///
///     fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
///         Ok(Self(0))
///     }
///
///     fn process<'a>(
///         &'a mut self,
///         _cfg: &UdfCfg<Process>,
///         _args: &ArgList<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<Self::Returns<'a>, ProcessError> {
///         Ok(self.0)
///     }
/// }
///
/// #[register(name = "sum_total")]
/// impl AggregateUdf for Total {
///     fn clear(
///         &mut self,
///         _cfg: &UdfCfg<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<(), NonZeroU8> {
///         self.0 = 0;
///         Ok(())
///     }
///
///     fn add(
///         &mut self,
///         _cfg: &UdfCfg<Process>,
///         args: &ArgList<Process>,
///         _error: Option<NonZeroU8>,
///     ) -> Result<(), NonZeroU8> {
///         self.0 += args.iter().filter_map(|a| a.value().as_int()).sum::<i64>();
///         Ok(())
///     }
/// }
/// # fn main() {}
/// ```
pub trait AggregateUdf: BasicUdf {
    /// Reset the state for a new group
    ///
    /// # Errors
    ///
    /// The error code is written to the server's error flag.
    fn clear(&mut self, cfg: &UdfCfg<Process>, error: Option<NonZeroU8>) -> Result<(), NonZeroU8>;

    /// Fold one row into the state
    ///
    /// # Errors
    ///
    /// The error code is written to the server's error flag and seen by the following calls.
    fn add(
        &mut self,
        cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8>;

    /// Take one row back out of the state, when used as a window function
    ///
    /// Only MariaDB calls this, and `#[register]` only exports `xxx_remove` if it is
    /// overridden.
    ///
    /// # Errors
    ///
    /// Same as [`AggregateUdf::add`].
    #[inline]
    fn remove(
        &mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        Ok(())
    }
}

/// Implemented by `#[register]` on a [`BasicUdf`] so the [`AggregateUdf`] registration can be
/// checked against it at compile time
#[doc(hidden)]
pub trait RegisteredBasicUdf {
    /// What is boxed into `UDF_INIT::ptr`: `Self`, or `Self` plus a slot for owned results
    type Storage;
    /// Exported name
    const NAME: &'static str;
    /// Other exported names
    const ALIASES: &'static [&'static str];
    /// True if `NAME` was derived from the struct name
    const DEFAULT_NAME_USED: bool;
}
