//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::cell::UnsafeCell;
use std::ffi::{c_uint, c_ulong};
use std::fmt;
use std::marker::PhantomData;

use udf_sys::UDF_INIT;

use crate::types::{Init, UdfState};

/// The settings of one function call context, a view over `UDF_INIT`
///
/// Every callback gets the same context, so settings made in `init` are visible later.
/// Setters only exist on `UdfCfg<Init>`: the server reads them once `init` returns.
#[repr(transparent)]
pub struct UdfCfg<S: UdfState>(UnsafeCell<UDF_INIT>, PhantomData<S>);

impl<S: UdfState> UdfCfg<S> {
    /// # Safety
    ///
    /// `ptr` must be valid, and not be used through anything else, for `'p`.
    #[inline]
    pub(crate) unsafe fn from_raw_ptr<'p>(ptr: *mut UDF_INIT) -> &'p Self {
        // SAFETY: repr(transparent) over UnsafeCell<UDF_INIT>, validity is the caller's promise
        unsafe { &*ptr.cast::<Self>() }
    }

    #[inline]
    fn raw(&self) -> &UDF_INIT {
        // SAFETY: no `&mut` to the inner struct is ever handed out
        unsafe { &*self.0.get() }
    }

    /// Whether the function may return `NULL`
    #[inline]
    pub fn get_maybe_null(&self) -> bool {
        self.raw().maybe_null
    }

    /// Number of digits after the decimal point in real results
    #[inline]
    pub fn get_decimals(&self) -> u32 {
        self.raw().decimals as u32
    }

    /// Maximum length of a string result
    #[inline]
    pub fn get_max_len(&self) -> u64 {
        self.raw().max_length as u64
    }

    /// Whether the function always returns the same result for the same statement
    #[inline]
    pub fn get_is_const(&self) -> bool {
        self.raw().const_item
    }

    /// Put the function's state into `ptr`. Whatever was there is not freed.
    #[inline]
    pub(crate) fn store_box<T>(&self, b: Box<T>) {
        // SAFETY: single-threaded access through `&self`
        unsafe { (*self.0.get()).ptr = Box::into_raw(b).cast() };
    }

    /// Take the function's state back out of `ptr`, leaving it null
    ///
    /// # Safety
    ///
    /// `ptr` must be null or have been set by `store_box::<T>`.
    #[inline]
    pub(crate) unsafe fn retrieve_box<T>(&self) -> Option<Box<T>> {
        // SAFETY: single-threaded access through `&self`
        let ptr = unsafe { std::mem::replace(&mut (*self.0.get()).ptr, std::ptr::null_mut()) };
        if ptr.is_null() {
            None
        } else {
            // SAFETY: created by `Box::into_raw` in `store_box`
            Some(unsafe { Box::from_raw(ptr.cast::<T>()) })
        }
    }

    /// Borrow the function's state in place
    ///
    /// # Safety
    ///
    /// Same as [`UdfCfg::retrieve_box`]. The borrow must end before the next callback.
    #[inline]
    pub(crate) unsafe fn state_mut<'p, T>(&self) -> Option<&'p mut T> {
        let ptr = self.raw().ptr.cast::<T>();
        // SAFETY: created by `Box::into_raw` in `store_box`, uniquely borrowed for this call
        unsafe { ptr.as_mut() }
    }
}

impl UdfCfg<Init> {
    /// Set whether the function may return `NULL`
    ///
    /// `#[register]` sets this already when `Returns` is an `Option`.
    #[inline]
    pub fn set_maybe_null(&self, v: bool) {
        // SAFETY: single-threaded access through `&self`
        unsafe { (*self.0.get()).maybe_null = v };
    }

    /// Set the number of digits after the decimal point of a real result. At most 31.
    #[inline]
    pub fn set_decimals(&self, v: u32) {
        // SAFETY: single-threaded access through `&self`
        unsafe { (*self.0.get()).decimals = v as c_uint };
    }

    /// Set the maximum length of a string result
    ///
    /// Values over 65535 make the server use a blob type for the result.
    #[inline]
    pub fn set_max_len(&self, v: u32) {
        // SAFETY: single-threaded access through `&self`
        unsafe { (*self.0.get()).max_length = v as c_ulong };
    }

    /// Set whether the function always returns the same result for the same statement
    #[inline]
    pub fn set_is_const(&self, v: bool) {
        // SAFETY: single-threaded access through `&self`
        unsafe { (*self.0.get()).const_item = v };
    }
}

impl<S: UdfState> fmt::Debug for UdfCfg<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdfCfg")
            .field("maybe_null", &self.get_maybe_null())
            .field("decimals", &self.get_decimals())
            .field("max_len", &self.get_max_len())
            .field("is_const", &self.get_is_const())
            .finish()
    }
}
