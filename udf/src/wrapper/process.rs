//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! The `xxx` callback, one wrapper per return shape
//!
//! Any `Err` or panic sets `error` and returns a zero value or a null pointer.
//!
//! Functions are boxed into `UDF_INIT::ptr` and live across calls, so the wrappers that name
//! `Returns<'a>` for every `'a` also require `U: 'static`.
use std::ffi::{c_char, c_uchar, c_ulong};
use std::num::NonZeroU8;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use udf_sys::{UDF_ARGS, UDF_INIT};

use super::functions::{BufConverter, UdfConverter};
use super::helpers::{panic_message, read_error, set_flag};
use crate::callconv::{box_buf_in_result, BufRet, BufRetOption, ScalarRet};
use crate::traits::BasicUdf;
use crate::types::{ArgList, Process, ProcessError, UdfCfg};
use crate::udf_log;

/// Borrow the state and arguments for one call of `process`
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`, and `W` the type `wrap_init` boxed.
unsafe fn run_process<W, T, F>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
    f: F,
) -> Option<T>
where
    F: FnOnce(
        &mut W,
        &UdfCfg<Process>,
        &ArgList<Process>,
        Option<NonZeroU8>,
    ) -> Result<T, ProcessError>,
{
    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: valid for the duration of this call, per the caller
        let cfg: &UdfCfg<Process> = unsafe { UdfCfg::from_raw_ptr(initid) };
        // SAFETY: as above
        let arglist: ArgList<Process> = unsafe { ArgList::from_raw_ptr(args) };
        // SAFETY: `ptr` is null or was set by `wrap_init`
        let Some(state) = (unsafe { cfg.state_mut::<W>() }) else {
            udf_log!(Error: "process called without a successful init");
            return Err(ProcessError);
        };
        // SAFETY: readable, per the caller
        let err = unsafe { read_error(error) };
        f(state, cfg, &arglist, err)
    }));

    match result {
        Ok(Ok(v)) => Some(v),
        Ok(Err(ProcessError)) => {
            // SAFETY: writable, per the caller
            unsafe { set_flag(error, 1) };
            None
        }
        Err(payload) => {
            udf_log!(Critical: "process function panicked: {}", panic_message(&*payload));
            // SAFETY: as above
            unsafe {
                set_flag(is_null, 1);
                set_flag(error, 1);
            }
            None
        }
    }
}

/// `xxx` for functions returning an integer or a real
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_basic<W, U, R>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> R::Abi
where
    W: UdfConverter<U>,
    for<'a> U: BasicUdf<Returns<'a> = R>,
    U: 'static,
    R: ScalarRet,
{
    trace_call!(enter, U, R::KIND, initid, args);
    // SAFETY: forwarded from the caller
    let ret = unsafe {
        run_process::<W, _, _>(initid, args, is_null, error, |w: &mut W, cfg, arglist, err| {
            w.as_mut_ref().process(cfg, arglist, err)
        })
    };
    trace_call!(exit, U, R::KIND, initid, args);

    ret.map(ScalarRet::into_abi).unwrap_or_default()
}

/// `xxx` for functions returning a nullable integer or real
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_basic_option<W, U, R>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> R::Abi
where
    W: UdfConverter<U>,
    for<'a> U: BasicUdf<Returns<'a> = Option<R>>,
    U: 'static,
    R: ScalarRet,
{
    trace_call!(enter, U, R::KIND, initid, args);
    // SAFETY: forwarded from the caller
    let ret = unsafe {
        run_process::<W, _, _>(initid, args, is_null, error, |w: &mut W, cfg, arglist, err| {
            w.as_mut_ref().process(cfg, arglist, err)
        })
    };
    trace_call!(exit, U, R::KIND, initid, args);

    match ret {
        Some(Some(v)) => v.into_abi(),
        Some(None) => {
            // SAFETY: writable, per the caller
            unsafe { set_flag(is_null, 1) };
            R::Abi::default()
        }
        None => R::Abi::default(),
    }
}

/// `xxx` for functions returning a string borrowed from themselves
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_buf<W, U>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char
where
    W: UdfConverter<U>,
    U: BasicUdf,
    for<'a> U::Returns<'a>: BufRet,
{
    trace_call!(enter, U, String, initid, args);
    let process = |w: &mut W,
                   cfg: &UdfCfg<Process>,
                   arglist: &ArgList<Process>,
                   err: Option<NonZeroU8>|
     -> Result<*mut c_char, ProcessError> {
        let v = w.as_mut_ref().process(cfg, arglist, err)?;
        // SAFETY: `v` points into the boxed state, which outlives this call
        Ok(unsafe { box_buf_in_result(v.as_sql_bytes(), result, length) })
    };
    // SAFETY: forwarded from the caller
    let ret = unsafe { run_process::<W, _, _>(initid, args, is_null, error, process) };
    trace_call!(exit, U, String, initid, args);

    ret.unwrap_or(ptr::null_mut())
}

/// `xxx` for functions returning a nullable string borrowed from themselves
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_buf_option<W, U>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char
where
    W: UdfConverter<U>,
    U: BasicUdf,
    for<'a> U::Returns<'a>: BufRetOption,
{
    trace_call!(enter, U, String, initid, args);
    let process = |w: &mut W,
                   cfg: &UdfCfg<Process>,
                   arglist: &ArgList<Process>,
                   err: Option<NonZeroU8>|
     -> Result<*mut c_char, ProcessError> {
        let v = w.as_mut_ref().process(cfg, arglist, err)?;
        let Some(bytes) = v.as_sql_bytes_opt() else {
            // SAFETY: writable, per the caller
            unsafe { set_flag(is_null, 1) };
            return Ok(ptr::null_mut());
        };
        // SAFETY: `bytes` points into the boxed state, which outlives this call
        Ok(unsafe { box_buf_in_result(bytes, result, length) })
    };
    // SAFETY: forwarded from the caller
    let ret = unsafe { run_process::<W, _, _>(initid, args, is_null, error, process) };
    trace_call!(exit, U, String, initid, args);

    ret.unwrap_or(ptr::null_mut())
}

/// `xxx` for functions returning an owned string
///
/// The value is kept in the [`BufConverter`] until the next call, in case it does not fit
/// the server's buffer.
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_buf_owned<U, B>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char
where
    for<'a> U: BasicUdf<Returns<'a> = B>,
    U: 'static,
    B: BufRet,
{
    trace_call!(enter, U, String, initid, args);
    let process = |w: &mut BufConverter<U, B>,
                   cfg: &UdfCfg<Process>,
                   arglist: &ArgList<Process>,
                   err: Option<NonZeroU8>|
     -> Result<*mut c_char, ProcessError> {
        let v = w.udf.process(cfg, arglist, err)?;
        let stored = w.stash.insert(v);
        // SAFETY: `stored` lives in the boxed state until the next call
        Ok(unsafe { box_buf_in_result(stored.as_sql_bytes(), result, length) })
    };
    // SAFETY: forwarded from the caller
    let ret = unsafe {
        run_process::<BufConverter<U, B>, _, _>(initid, args, is_null, error, process)
    };
    trace_call!(exit, U, String, initid, args);

    ret.unwrap_or(ptr::null_mut())
}

/// `xxx` for functions returning a nullable owned string
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx`.
pub unsafe fn wrap_process_buf_owned_option<U, B>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char
where
    for<'a> U: BasicUdf<Returns<'a> = Option<B>>,
    U: 'static,
    B: BufRet,
{
    trace_call!(enter, U, String, initid, args);
    let process = |w: &mut BufConverter<U, B>,
                   cfg: &UdfCfg<Process>,
                   arglist: &ArgList<Process>,
                   err: Option<NonZeroU8>|
     -> Result<*mut c_char, ProcessError> {
        w.stash = w.udf.process(cfg, arglist, err)?;
        let Some(stored) = w.stash.as_ref() else {
            // SAFETY: writable, per the caller
            unsafe { set_flag(is_null, 1) };
            return Ok(ptr::null_mut());
        };
        // SAFETY: `stored` lives in the boxed state until the next call
        Ok(unsafe { box_buf_in_result(stored.as_sql_bytes(), result, length) })
    };
    // SAFETY: forwarded from the caller
    let ret = unsafe {
        run_process::<BufConverter<U, B>, _, _>(initid, args, is_null, error, process)
    };
    trace_call!(exit, U, String, initid, args);

    ret.unwrap_or(ptr::null_mut())
}
