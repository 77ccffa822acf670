//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Raw bindings to the MySQL/MariaDB user-defined function ABI.
//!
//! Everything in [`bindings`] mirrors `udf_registration_types.h` field for field. The
//! [`callback`] module describes the same callbacks as data: which kinds exist, what each
//! one is handed, and how a type-erased [`Udf_func_any`] is turned back into something
//! callable once the SQL return type is known.
//!
//! Nothing in here is safe to call on its own. Use the `udf` crate.
#![deny(unsafe_op_in_unsafe_fn)]

mod bindings;
pub mod callback;

pub use bindings::*;
pub use callback::*;

/// Size of the buffer handed to `xxx_init` for an error message, including the trailing NUL
pub const MYSQL_ERRMSG_SIZE: usize = 512;

/// Capacity of the result buffer the server hands to string-returning functions
///
/// Results that fit are copied into it, longer results must live elsewhere until the next
/// call.
pub const MYSQL_RESULT_BUFFER_SIZE: usize = 255;

#[cfg(all(test, target_pointer_width = "64"))]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn layout_udf_args() {
        assert_eq!(size_of::<UDF_ARGS>(), 64, "Size of: UDF_ARGS");
        assert_eq!(align_of::<UDF_ARGS>(), 8, "Alignment of UDF_ARGS");
        assert_eq!(offset_of!(UDF_ARGS, arg_count), 0);
        assert_eq!(offset_of!(UDF_ARGS, arg_types), 8);
        assert_eq!(offset_of!(UDF_ARGS, args), 16);
        assert_eq!(offset_of!(UDF_ARGS, lengths), 24);
        assert_eq!(offset_of!(UDF_ARGS, maybe_null), 32);
        assert_eq!(offset_of!(UDF_ARGS, attributes), 40);
        assert_eq!(offset_of!(UDF_ARGS, attribute_lengths), 48);
        assert_eq!(offset_of!(UDF_ARGS, extension), 56);
    }

    #[test]
    fn layout_udf_init() {
        assert_eq!(size_of::<UDF_INIT>(), 40, "Size of: UDF_INIT");
        assert_eq!(align_of::<UDF_INIT>(), 8, "Alignment of UDF_INIT");
        assert_eq!(offset_of!(UDF_INIT, maybe_null), 0);
        assert_eq!(offset_of!(UDF_INIT, decimals), 4);
        assert_eq!(offset_of!(UDF_INIT, max_length), 8);
        assert_eq!(offset_of!(UDF_INIT, ptr), 16);
        assert_eq!(offset_of!(UDF_INIT, const_item), 24);
        assert_eq!(offset_of!(UDF_INIT, extension), 32);
    }

    #[test]
    fn item_result_is_c_int_sized() {
        assert_eq!(size_of::<Item_result>(), size_of::<std::ffi::c_int>());
        assert_eq!(Item_result::INVALID_RESULT as i32, -1);
        assert_eq!(Item_result::DECIMAL_RESULT as i32, 4);
    }

    #[test]
    fn item_result_from_raw() {
        assert_eq!(Item_result::try_from(2), Ok(Item_result::INT_RESULT));
        assert_eq!(Item_result::try_from(-1), Ok(Item_result::INVALID_RESULT));
        assert_eq!(Item_result::try_from(7), Err(InvalidItemResult(7)));
    }
}
