//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Call tracing, enabled with `logging-debug`. `logging-debug-calls` also dumps the raw structs.
#![cfg(feature = "logging-debug")]
use std::any::type_name;

use udf_sys::{CallbackKind, UDF_ARGS, UDF_INIT};

use crate::udf_log;

/// # Safety
///
/// Pointers must be null or valid.
pub(crate) unsafe fn enter<U>(kind: CallbackKind, initid: *const UDF_INIT, args: *const UDF_ARGS) {
    udf_log!(Debug: "ENTER {kind} for `{}`", type_name::<U>());
    if cfg!(feature = "logging-debug-calls") {
        // SAFETY: null or valid, per the caller
        unsafe { dump("receive", kind, initid, args) };
    }
}

/// # Safety
///
/// Pointers must be null or valid.
pub(crate) unsafe fn exit<U>(kind: CallbackKind, initid: *const UDF_INIT, args: *const UDF_ARGS) {
    if cfg!(feature = "logging-debug-calls") {
        // SAFETY: null or valid, per the caller
        unsafe { dump("return", kind, initid, args) };
    }
    udf_log!(Debug: "EXIT {kind} for `{}`", type_name::<U>());
}

unsafe fn dump(
    direction: &str,
    kind: CallbackKind,
    initid: *const UDF_INIT,
    args: *const UDF_ARGS,
) {
    udf_log!(Debug: "data {direction} state at {kind}");
    // SAFETY: null or valid, per the caller
    if let Some(init) = unsafe { initid.as_ref() } {
        udf_log!(Debug: "[{direction}]: initid = {init:#?}");
    }
    // SAFETY: as above
    if let Some(args) = unsafe { args.as_ref() } {
        udf_log!(Debug: "[{direction}]: args = {args:#?}");
    }
}
