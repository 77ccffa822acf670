//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Lifecycle callbacks: `init`, `deinit`, and the aggregate `clear`, `add` and `remove`
use std::ffi::{c_char, c_uchar};
use std::num::NonZeroU8;
use std::panic::{catch_unwind, AssertUnwindSafe};

use udf_sys::{UDF_ARGS, UDF_INIT};

use super::helpers::{panic_message, read_error, set_flag, write_msg_to_buf};
use crate::traits::{AggregateUdf, BasicUdf};
use crate::types::{ArgList, Init, Process, UdfCfg};
use crate::{udf_log, MYSQL_ERRMSG_SIZE};

/// What is boxed into `UDF_INIT::ptr` for a `U`
///
/// Usually `U` itself. Functions that return owned strings need somewhere to keep the value
/// until the server has copied it, see [`BufConverter`].
pub trait UdfConverter<U> {
    fn as_mut_ref(&mut self) -> &mut U;
    fn into_storable(source: U) -> Self;
}

impl<U> UdfConverter<U> for U {
    #[inline]
    fn as_mut_ref(&mut self) -> &mut U {
        self
    }

    #[inline]
    fn into_storable(source: U) -> Self {
        source
    }
}

/// A function plus the last owned string it returned
///
/// The server may read a returned pointer until the next call on the same context, so the
/// value lives here until it is replaced or the context is torn down.
#[derive(Debug)]
pub struct BufConverter<U, B> {
    pub(crate) udf: U,
    pub(crate) stash: Option<B>,
}

impl<U, B> UdfConverter<U> for BufConverter<U, B> {
    #[inline]
    fn as_mut_ref(&mut self) -> &mut U {
        &mut self.udf
    }

    #[inline]
    fn into_storable(source: U) -> Self {
        Self { udf: source, stash: None }
    }
}

/// `xxx_init`: check argument types, call [`BasicUdf::init`] and box the result
///
/// Returns `true` on failure, with the reason written to `message`.
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx_init`.
pub unsafe fn wrap_init<W: UdfConverter<U>, U: BasicUdf>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    message: *mut c_char,
    maybe_null: bool,
) -> bool {
    trace_call!(enter, U, Init, initid, args);

    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: valid for the duration of this call, per the caller
        let cfg: &UdfCfg<Init> = unsafe { UdfCfg::from_raw_ptr(initid) };
        // SAFETY: as above
        let arglist: ArgList<Init> = unsafe { ArgList::from_raw_ptr(args) };

        if let Err(e) = arglist.check_types() {
            return Err(e.to_string());
        }
        if maybe_null {
            cfg.set_maybe_null(true);
        }

        let udf = U::init(cfg, &arglist)?;
        arglist.flush_all_coercions();
        cfg.store_box(Box::new(W::into_storable(udf)));
        Ok(())
    }));

    let failed = match result {
        Ok(Ok(())) => false,
        Ok(Err(msg)) => {
            // SAFETY: the server provides `MYSQL_ERRMSG_SIZE` bytes
            unsafe { write_msg_to_buf::<MYSQL_ERRMSG_SIZE>(msg.as_bytes(), message) };
            true
        }
        Err(payload) => {
            udf_log!(Critical: "init function panicked: {}", panic_message(&*payload));
            // SAFETY: as above
            unsafe {
                write_msg_to_buf::<MYSQL_ERRMSG_SIZE>(
                    b"(critical) init function panicked",
                    message,
                )
            };
            true
        }
    };

    trace_call!(exit, U, Init, initid, args);
    failed
}

/// `xxx_deinit`: drop the boxed state
///
/// Nothing happens if `init` failed or this already ran.
///
/// # Safety
///
/// `initid` must be the pointer the server passes to `xxx_deinit`.
pub unsafe fn wrap_deinit<W: UdfConverter<U>, U: BasicUdf>(initid: *const UDF_INIT) {
    trace_call!(enter, U, Deinit, initid, std::ptr::null::<UDF_ARGS>());

    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: valid for the duration of this call, per the caller
        let cfg: &UdfCfg<Process> = unsafe { UdfCfg::from_raw_ptr(initid.cast_mut()) };
        // SAFETY: `ptr` is null or was set by `wrap_init::<W, U>`
        drop(unsafe { cfg.retrieve_box::<W>() });
    }));
    if let Err(payload) = result {
        udf_log!(Critical: "deinit function panicked: {}", panic_message(&*payload));
    }

    trace_call!(exit, U, Deinit, initid, std::ptr::null::<UDF_ARGS>());
}

/// Run an aggregate step against the boxed state, writing any error code to `error`
///
/// # Safety
///
/// `initid` and `error` must come from the server, and `args` must be null or valid.
unsafe fn run_aggregate_step<W, U, F>(
    what: &str,
    initid: *mut UDF_INIT,
    error: *mut c_uchar,
    step: F,
) where
    W: UdfConverter<U>,
    U: AggregateUdf,
    F: FnOnce(&mut U, &UdfCfg<Process>, Option<NonZeroU8>) -> Result<(), NonZeroU8>,
{
    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: valid for the duration of this call, per the caller
        let cfg: &UdfCfg<Process> = unsafe { UdfCfg::from_raw_ptr(initid) };
        // SAFETY: `ptr` is null or was set by `wrap_init::<W, U>`
        let Some(state) = (unsafe { cfg.state_mut::<W>() }) else {
            udf_log!(Error: "{what} called without a successful init");
            return Err(NonZeroU8::MIN);
        };
        // SAFETY: readable, per the caller
        let err = unsafe { read_error(error) };
        step(state.as_mut_ref(), cfg, err)
    }));

    let code = match result {
        Ok(Ok(())) => return,
        Ok(Err(code)) => code,
        Err(payload) => {
            udf_log!(Critical: "{what} function panicked: {}", panic_message(&*payload));
            NonZeroU8::MIN
        }
    };
    // SAFETY: writable, per the caller
    unsafe { set_flag(error, code.get()) };
}

/// `xxx_clear`: reset the aggregate for a new group
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx_clear`.
pub unsafe fn wrap_clear<W: UdfConverter<U>, U: AggregateUdf>(
    initid: *mut UDF_INIT,
    _is_null: *mut c_uchar,
    error: *mut c_uchar,
) {
    trace_call!(enter, U, Clear, initid, std::ptr::null::<UDF_ARGS>());
    // SAFETY: forwarded from the caller
    unsafe {
        run_aggregate_step::<W, U, _>("clear", initid, error, |udf, cfg, err| udf.clear(cfg, err))
    };
    trace_call!(exit, U, Clear, initid, std::ptr::null::<UDF_ARGS>());
}

/// `xxx_add`: fold a row into the aggregate
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx_add`.
pub unsafe fn wrap_add<W: UdfConverter<U>, U: AggregateUdf>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    _is_null: *mut c_uchar,
    error: *mut c_uchar,
) {
    trace_call!(enter, U, Add, initid, args);
    let step = |udf: &mut U, cfg: &UdfCfg<Process>, err: Option<NonZeroU8>| {
        // SAFETY: valid for the duration of this call
        let arglist: ArgList<Process> = unsafe { ArgList::from_raw_ptr(args) };
        udf.add(cfg, &arglist, err)
    };
    // SAFETY: forwarded from the caller
    unsafe { run_aggregate_step::<W, U, _>("add", initid, error, step) };
    trace_call!(exit, U, Add, initid, args);
}

/// `xxx_remove`: take a row back out of the aggregate
///
/// # Safety
///
/// Pointers must be the ones the server passes to `xxx_remove`.
pub unsafe fn wrap_remove<W: UdfConverter<U>, U: AggregateUdf>(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    _is_null: *mut c_uchar,
    error: *mut c_uchar,
) {
    trace_call!(enter, U, Add, initid, args);
    let step = |udf: &mut U, cfg: &UdfCfg<Process>, err: Option<NonZeroU8>| {
        // SAFETY: valid for the duration of this call
        let arglist: ArgList<Process> = unsafe { ArgList::from_raw_ptr(args) };
        udf.remove(cfg, &arglist, err)
    };
    // SAFETY: forwarded from the caller
    unsafe { run_aggregate_step::<W, U, _>("remove", initid, error, step) };
    trace_call!(exit, U, Add, initid, args);
}
