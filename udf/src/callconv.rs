//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
#![doc(hidden)]
#![deny(unsafe_op_in_unsafe_fn)]
//! How values returned from `process` are handed to the server
//!
//! Integers and reals are returned by value from `xxx`. Everything else is a string: either
//! copied into the server's result buffer or, when it does not fit, returned as a pointer to
//! memory that lives until the next call.
use std::borrow::Cow;
use std::ffi::{c_char, c_double, c_longlong, c_ulong};
use std::ptr;
use std::rc::Rc;
use std::sync::Arc;

use udf_sys::CallbackKind;

/// A value returned by value from a `longlong` or `double` process function
///
/// # Safety
///
/// `KIND` must be the callback kind whose return type is `Abi`.
pub unsafe trait ScalarRet: Copy {
    /// Type returned across the FFI boundary
    type Abi: Copy + Default;
    /// Which process callback returns `Abi`
    const KIND: CallbackKind;

    fn into_abi(self) -> Self::Abi;
}

macro_rules! return_packaging_for_scalars {
    ($($scalar:ty => $abi:ty, $kind:ident);* $(;)?) => {
        $(unsafe impl ScalarRet for $scalar {
            type Abi = $abi;
            const KIND: CallbackKind = CallbackKind::$kind;

            #[inline]
            fn into_abi(self) -> Self::Abi {
                self as $abi
            }
        })*
    }
}

return_packaging_for_scalars! {
    i64 => c_longlong, LongLong;
    f64 => c_double, Double;
}

/// A value returned through the `string` process function
///
/// # Safety
///
/// The slice must stay valid as long as `self` does not move or drop.
pub unsafe trait BufRet {
    fn as_sql_bytes(&self) -> &[u8];
}

macro_rules! return_packaging_for_buffers {
    ($($buf:ty => |$s:ident| $e:expr);* $(;)?) => {
        $(unsafe impl BufRet for $buf {
            #[inline]
            fn as_sql_bytes(&self) -> &[u8] {
                let $s = self;
                $e
            }
        })*
    }
}

return_packaging_for_buffers! {
    str => |s| s.as_bytes();
    [u8] => |s| s;
    String => |s| s.as_bytes();
    Vec<u8> => |s| s.as_slice();
}

unsafe impl<T: BufRet + ?Sized> BufRet for &T {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

unsafe impl<T: BufRet + ?Sized> BufRet for &mut T {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

unsafe impl<T: BufRet + ?Sized> BufRet for Box<T> {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

unsafe impl<T: BufRet + ?Sized> BufRet for Rc<T> {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

unsafe impl<T: BufRet + ?Sized> BufRet for Arc<T> {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

unsafe impl<T: BufRet + ToOwned + ?Sized> BufRet for Cow<'_, T> {
    #[inline]
    fn as_sql_bytes(&self) -> &[u8] {
        (**self).as_sql_bytes()
    }
}

/// A string result that may be `NULL`
pub trait BufRetOption {
    fn as_sql_bytes_opt(&self) -> Option<&[u8]>;
}

impl<T: BufRet> BufRetOption for Option<T> {
    #[inline]
    fn as_sql_bytes_opt(&self) -> Option<&[u8]> {
        self.as_ref().map(BufRet::as_sql_bytes)
    }
}

/// Hand a string result to the server
///
/// On entry `*length` is the capacity of `result`. If `bytes` fits it is copied there and
/// `result` is returned, otherwise a pointer to `bytes` itself. `*length` is set to the byte
/// length either way.
///
/// # Safety
///
/// `result` must be writable for `*length` bytes. If `bytes` does not fit, it must stay valid
/// until the server's next call on this context.
#[inline]
pub unsafe fn box_buf_in_result(
    bytes: &[u8],
    result: *mut c_char,
    length: *mut c_ulong,
) -> *mut c_char {
    // SAFETY: the caller provides valid pointers
    unsafe {
        let capacity = *length as usize;
        *length = bytes.len() as c_ulong;

        if bytes.len() <= capacity && !result.is_null() {
            ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), result, bytes.len());
            result
        } else {
            bytes.as_ptr().cast::<c_char>().cast_mut()
        }
    }
}
