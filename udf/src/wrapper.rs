//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
#![deny(unsafe_op_in_unsafe_fn)]
//! The `extern "C"` side of a function, called from code `#[register]` expands to
//!
//! Nothing in here is stable API. Every entry point catches panics, since unwinding into the
//! server is undefined behavior.

/// Log entry into and exit from a callback with `logging-debug`
macro_rules! trace_call {
    ($dir:ident, $udf:ty, $kind:ident, $initid:expr, $args:expr) => {
        trace_call!($dir, $udf, ::udf_sys::CallbackKind::$kind, $initid, $args)
    };
    ($dir:ident, $udf:ty, $kind:expr, $initid:expr, $args:expr) => {
        #[cfg(feature = "logging-debug")]
        // SAFETY: pointers come straight from the server
        unsafe {
            $crate::wrapper::debug::$dir::<$udf>(
                $kind,
                $initid as *const ::udf_sys::UDF_INIT,
                $args as *const ::udf_sys::UDF_ARGS,
            )
        };
    };
}

mod const_helpers;
#[cfg(feature = "logging-debug")]
mod debug;
mod functions;
mod helpers;
mod process;

pub use const_helpers::{const_slice_eq, const_str_eq, verify_aggregate_name};
pub use functions::{
    wrap_add, wrap_clear, wrap_deinit, wrap_init, wrap_remove, BufConverter, UdfConverter,
};
pub use helpers::write_msg_to_buf;
pub use process::{
    wrap_process_basic, wrap_process_basic_option, wrap_process_buf, wrap_process_buf_option,
    wrap_process_buf_owned, wrap_process_buf_owned_option,
};
