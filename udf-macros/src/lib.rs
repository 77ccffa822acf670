//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
extern crate proc_macro;

mod entry;
mod types;

use proc_macro::TokenStream;

/// Export the C symbols the server looks up for a function
///
/// Put it on the `impl BasicUdf for T` block, and on the `impl AggregateUdf for T` block if
/// there is one. It emits, as `#[no_mangle] extern "C"` functions:
///
/// - on `BasicUdf`: `xxx_init`, `xxx_deinit` and `xxx`, where `xxx`'s signature depends on
///   `Returns` (`i64` is an integer function, `f64` a real function, anything else a string
///   function, all optionally in an `Option`)
/// - on `AggregateUdf`: `xxx_clear`, `xxx_add`, and `xxx_remove` if `remove` is overridden
///
/// `xxx` is the struct's name in snake case, so `SumInt` registers `sum_int`.
///
/// # Arguments
///
/// - `name = "..."` picks another name
/// - `alias = "..."` exports the same function under one more name, and can be repeated
///
/// The `AggregateUdf` registration must repeat the same arguments. This is checked at compile
/// time.
///
/// ```ignore
/// #[register(name = "avg2", alias = "average_two")]
/// impl BasicUdf for Avg2 { /* ... */ }
///
/// #[register(name = "avg2", alias = "average_two")]
/// impl AggregateUdf for Avg2 { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn register(attr: TokenStream, item: TokenStream) -> TokenStream {
    entry::register(attr.into(), item.into()).unwrap_or_else(syn::Error::into_compile_error).into()
}
