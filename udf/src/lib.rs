//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `udf` is a framework for writing MySQL and MariaDB user-defined functions in Rust.
//!
//! A function is a struct. Implement [`BasicUdf`] on it (and [`AggregateUdf`] if it folds
//! rows), put `#[register]` on each impl block, and build the crate as a `cdylib`. The macro
//! exports the `xxx`, `xxx_init`, `xxx_deinit` (and for aggregates `xxx_clear`, `xxx_add`,
//! `xxx_remove`) symbols the server looks up after `CREATE FUNCTION ... SONAME`.
//!
//! ```
//! use udf::prelude::*;
//!
//! struct SumInt;
//!
//! #[register]
//! impl BasicUdf for SumInt {
//!     type Returns<'a> = i64;
//!
//!     fn init(_cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
//!         for mut arg in args {
//!             arg.set_type_coercion(SqlType::Int);
//!         }
//!         Ok(Self)
//!     }
//!
//!     fn process<'a>(
//!         &'a mut self,
//!         _cfg: &UdfCfg<Process>,
//!         args: &ArgList<Process>,
//!         _error: Option<std::num::NonZeroU8>,
//!     ) -> Result<Self::Returns<'a>, ProcessError> {
//!         Ok(args.iter().filter_map(|a| a.value().as_int()).sum())
//!     }
//! }
//! ```
//!
//! The struct lives on the heap from `xxx_init` until `xxx_deinit`, so anything a function
//! needs between rows (buffers, aggregate state) goes in its fields. Dropping it is the
//! deinit.
#![deny(unsafe_op_in_unsafe_fn)]

extern crate self as udf;

pub use udf_macros::register;
#[doc(hidden)]
pub use udf_sys;
#[doc(hidden)]
pub use chrono;

pub mod callconv;
pub mod log;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod prelude;
pub mod traits;
pub mod types;
#[doc(hidden)]
pub mod wrapper;

pub use traits::*;
pub use types::*;

pub use udf_sys::{MYSQL_ERRMSG_SIZE, MYSQL_RESULT_BUFFER_SIZE};
