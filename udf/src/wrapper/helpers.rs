//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::any::Any;
use std::cmp::min;
use std::ffi::{c_char, c_uchar};
use std::num::NonZeroU8;
use std::ptr;

/// Copy `msg` into a buffer of `N` bytes, truncating to `N - 1` and adding a NUL
///
/// # Safety
///
/// `buf` must be writable for `N` bytes.
pub unsafe fn write_msg_to_buf<const N: usize>(msg: &[u8], buf: *mut c_char) {
    if N == 0 || buf.is_null() {
        return;
    }
    let to_write = min(msg.len(), N - 1);

    // SAFETY: the caller promises `N` bytes, we write at most `N`
    unsafe {
        ptr::copy_nonoverlapping(msg.as_ptr().cast::<c_char>(), buf, to_write);
        *buf.add(to_write) = 0;
    }
}

/// The error code the server handed in, if any
///
/// # Safety
///
/// `error` must be null or readable.
#[inline]
pub(crate) unsafe fn read_error(error: *const c_uchar) -> Option<NonZeroU8> {
    // SAFETY: checked for null, readable otherwise
    unsafe { error.as_ref().and_then(|e| NonZeroU8::new(*e)) }
}

/// # Safety
///
/// `flag` must be null or writable.
#[inline]
pub(crate) unsafe fn set_flag(flag: *mut c_uchar, value: c_uchar) {
    // SAFETY: checked for null, writable otherwise
    if let Some(f) = unsafe { flag.as_mut() } {
        *f = value;
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    const MSG: &str = "message";
    const BUF_SIZE: usize = MSG.len() + 1;

    #[test]
    fn write_msg_ok() {
        let mut mbuf = [1 as c_char; BUF_SIZE];
        unsafe { write_msg_to_buf::<BUF_SIZE>(MSG.as_bytes(), mbuf.as_mut_ptr()) };
        let s = unsafe { CStr::from_ptr(mbuf.as_ptr()) }.to_str().unwrap();
        assert_eq!(s, MSG);
    }

    #[test]
    fn write_msg_truncates() {
        const SHORT: usize = BUF_SIZE - 1;
        let mut mbuf = [1 as c_char; SHORT];
        unsafe { write_msg_to_buf::<SHORT>(MSG.as_bytes(), mbuf.as_mut_ptr()) };
        let s = unsafe { CStr::from_ptr(mbuf.as_ptr()) }.to_str().unwrap();
        assert_eq!(s, &MSG[..MSG.len() - 1]);
    }

    #[test]
    fn write_msg_full_size() {
        let long = "x".repeat(2000);
        let mut mbuf = [1 as c_char; crate::MYSQL_ERRMSG_SIZE];
        unsafe {
            write_msg_to_buf::<{ crate::MYSQL_ERRMSG_SIZE }>(long.as_bytes(), mbuf.as_mut_ptr())
        };
        assert_eq!(mbuf[crate::MYSQL_ERRMSG_SIZE - 1], 0);
        let s = unsafe { CStr::from_ptr(mbuf.as_ptr()) };
        assert_eq!(s.to_bytes().len(), crate::MYSQL_ERRMSG_SIZE - 1);
    }

    #[test]
    fn flags() {
        let mut e: c_uchar = 0;
        assert_eq!(unsafe { read_error(&e) }, None);
        unsafe { set_flag(&mut e, 3) };
        assert_eq!(unsafe { read_error(&e) }, NonZeroU8::new(3));
        assert_eq!(unsafe { read_error(ptr::null()) }, None);
        unsafe { set_flag(ptr::null_mut(), 1) };
    }

    #[test]
    fn panic_payloads() {
        let p = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*p), "static");
        let p = std::panic::catch_unwind(|| panic!("formatted {}", 1)).unwrap_err();
        assert_eq!(panic_message(&*p), "formatted 1");
    }
}
