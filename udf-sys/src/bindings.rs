//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `#[repr(C)]` mirrors of the server's UDF registration types.
//!
//! Field documentation follows the C header. Some `*mut` became `*const` where the server
//! never expects the plugin to write.
use std::ffi::{c_char, c_double, c_int, c_longlong, c_uchar, c_uint, c_ulong, c_void};

/// Type of the user defined function return slot and arguments
#[repr(C)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Item_result {
    /// Invalid value (not valid for UDFs)
    INVALID_RESULT = -1,

    /// Value representing a string (char *)
    STRING_RESULT = 0,

    /// Value representing a real (double)
    REAL_RESULT = 1,

    /// Value representing an int (long long)
    INT_RESULT = 2,

    /// Value representing a row (not valid for UDFs)
    ROW_RESULT = 3,

    /// Value representing a decimal (char *)
    DECIMAL_RESULT = 4,
}

/// A raw `Item_result` tag outside of the known range
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid Item_result tag {0} received")]
pub struct InvalidItemResult(pub c_int);

impl TryFrom<c_int> for Item_result {
    type Error = InvalidItemResult;

    fn try_from(value: c_int) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::INVALID_RESULT),
            0 => Ok(Self::STRING_RESULT),
            1 => Ok(Self::REAL_RESULT),
            2 => Ok(Self::INT_RESULT),
            3 => Ok(Self::ROW_RESULT),
            4 => Ok(Self::DECIMAL_RESULT),
            _ => Err(InvalidItemResult(value)),
        }
    }
}

/// Representation of a sequence of SQL arguments
#[repr(C)]
#[derive(Debug, Clone)]
pub struct UDF_ARGS {
    /// Number of arguments present
    pub arg_count: c_uint,

    /// Buffer of `Item_result` that indicate argument type
    ///
    /// Remains mutable because it can be set in `xxx_init`
    pub arg_types: *mut Item_result,

    /// Buffer of pointers to the arguments. Arguments may be of any type
    /// (specified in `arg_types`). A null pointer is a SQL `NULL`, or during
    /// `xxx_init` a value that is not constant.
    pub args: *const *const c_char,

    /// Buffer of lengths for string arguments
    pub lengths: *const c_ulong,

    /// Indicates whether the argument may be null or not
    pub maybe_null: *const c_char,

    /// Buffer of string pointers that hold variable names, for use with error
    /// messages
    pub attributes: *const *const c_char,

    /// Buffer of lengths of attributes
    pub attribute_lengths: *const c_ulong,

    /// Extension is currently unused
    pub extension: *const c_void,
}

/// Information about the result of a user defined function
#[repr(C)]
#[derive(Debug, Clone)]
pub struct UDF_INIT {
    /// True if the function can return NULL
    pub maybe_null: bool,

    /// This is used for real-returning functions
    pub decimals: c_uint,

    /// This is used for string functions
    pub max_length: c_ulong,

    /// free pointer for function data
    pub ptr: *mut c_char,

    /// True if function always returns the same value
    pub const_item: bool,

    /// Unused at this time
    pub extension: *mut c_void,
}

/// Kind of function being registered
#[repr(u32)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Item_udftype {
    UDFTYPE_FUNCTION = 1,
    UDFTYPE_AGGREGATE = 2,
}

/// Signature of an `xxx_init(...)` function. Returns `true` on failure.
pub type UdfInitFn =
    unsafe extern "C" fn(initid: *mut UDF_INIT, args: *mut UDF_ARGS, message: *mut c_char) -> bool;

/// Signature of an `xxx_deinit(...)` function
pub type UdfDeinitFn = unsafe extern "C" fn(initid: *mut UDF_INIT);

/// Signature of an `xxx_clear(...)` aggregate function
pub type UdfClearFn =
    unsafe extern "C" fn(initid: *mut UDF_INIT, is_null: *mut c_uchar, error: *mut c_uchar);

/// Signature of an `xxx_add(...)` or `xxx_remove(...)` aggregate function
pub type UdfAddFn = unsafe extern "C" fn(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
);

/// Signature of an `xxx(...)` function returning a SQL real
pub type UdfDoubleFn = unsafe extern "C" fn(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> c_double;

/// Signature of an `xxx(...)` function returning a SQL integer
pub type UdfLongLongFn = unsafe extern "C" fn(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> c_longlong;

/// Signature of an `xxx(...)` function returning a SQL string or decimal
///
/// `length` holds the capacity of `result` on entry and the length of the returned data on
/// exit. The returned pointer may be `result` or any memory that outlives the call.
pub type UdfStringFn = unsafe extern "C" fn(
    initid: *mut UDF_INIT,
    args: *mut UDF_ARGS,
    result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char;

/// Signature of an untyped callback, used only to store one of the others
pub type UdfAnyFn = unsafe extern "C" fn();

pub type Udf_func_init = Option<UdfInitFn>;
pub type Udf_func_deinit = Option<UdfDeinitFn>;
pub type Udf_func_clear = Option<UdfClearFn>;
pub type Udf_func_add = Option<UdfAddFn>;
pub type Udf_func_double = Option<UdfDoubleFn>;
pub type Udf_func_longlong = Option<UdfLongLongFn>;
pub type Udf_func_string = Option<UdfStringFn>;
pub type Udf_func_any = Option<UdfAnyFn>;
