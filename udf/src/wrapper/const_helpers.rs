//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Compile-time checks emitted by `#[register]`
use crate::traits::RegisteredBasicUdf;

pub const fn const_str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }

    true
}

pub const fn const_slice_eq(a: &[&str], b: &[&str]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if !const_str_eq(a[i], b[i]) {
            return false;
        }
        i += 1;
    }

    true
}

/// Fail compilation unless the `AggregateUdf` registration of `T` exports the same names as
/// its `BasicUdf` registration
pub const fn verify_aggregate_name<T: RegisteredBasicUdf>(name: &str, aliases: &[&str]) {
    if !const_str_eq(T::NAME, name) {
        if T::DEFAULT_NAME_USED {
            panic!(
                "`#[register]` on `BasicUdf` uses the default name but `#[register]` on \
                 `AggregateUdf` sets `name`, they must match"
            );
        } else {
            panic!(
                "`#[register]` on `AggregateUdf` must use the same `name` as `#[register]` on \
                 `BasicUdf`"
            );
        }
    }
    if !const_slice_eq(T::ALIASES, aliases) {
        panic!(
            "`#[register]` on `AggregateUdf` must use the same `alias`es, in the same order, as \
             `#[register]` on `BasicUdf`"
        );
    }
}
