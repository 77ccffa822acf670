//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::ffi::c_int;
use std::fmt;
use std::{slice, str};

use udf_sys::Item_result;

use crate::types::{ArgList, Init, SqlResult, SqlType, UdfState};

/// One argument of a call
pub struct SqlArg<'a, S: UdfState> {
    list: &'a ArgList<'a, S>,
    index: usize,
}

impl<'a, S: UdfState> SqlArg<'a, S> {
    /// `index` must be in bounds
    #[inline]
    pub(crate) fn new(list: &'a ArgList<'a, S>, index: usize) -> Self {
        Self { list, index }
    }

    #[inline]
    fn raw_tag(&self) -> c_int {
        // SAFETY: index is in bounds
        unsafe { *self.list.raw().arg_types.add(self.index).cast::<c_int>() }
    }

    /// The argument's value
    ///
    /// During `init` only constant arguments have a value, everything else reads as `None`.
    /// Coercions requested in `init` are not visible until `process`.
    #[inline]
    pub fn value(&self) -> SqlResult<'a> {
        let raw = self.list.raw();
        let tag = Item_result::try_from(self.raw_tag()).unwrap_or(Item_result::INVALID_RESULT);
        // SAFETY: index is in bounds, the server sets type, pointer and length together
        let res = unsafe {
            let ptr = *raw.args.add(self.index);
            let len = *raw.lengths.add(self.index) as usize;
            SqlResult::from_ptr(ptr.cast(), tag, len)
        };
        // tags are checked before the first callback sees the list
        res.unwrap_or(SqlResult::String(None))
    }

    /// The text of the argument as written in the query, or its alias if it has one
    ///
    /// `select my_udf(id, 'hello', 1 + 2 as three)` gives `id`, `'hello'` and `three`.
    #[inline]
    pub fn attribute(&self) -> &'a str {
        let raw = self.list.raw();
        // SAFETY: index is in bounds
        let (ptr, len) = unsafe {
            (*raw.attributes.add(self.index), *raw.attribute_lengths.add(self.index) as usize)
        };
        if ptr.is_null() {
            return "";
        }
        // SAFETY: the server provides `len` bytes of identifier
        let bytes = unsafe { slice::from_raw_parts(ptr.cast::<u8>(), len) };
        str::from_utf8(bytes).unwrap_or("")
    }

    /// Whether this argument may be `NULL`
    #[inline]
    pub fn maybe_null(&self) -> bool {
        let raw = self.list.raw();
        // SAFETY: index is in bounds
        unsafe { *raw.maybe_null.add(self.index) != 0 }
    }

    /// Position in the argument list
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<'a> SqlArg<'a, Init> {
    /// Whether this argument is a constant
    ///
    /// A `NULL` literal cannot be told apart from a non-constant argument.
    #[inline]
    pub fn is_const(&self) -> bool {
        !self.value().is_null()
    }

    /// The type this argument will have in `process`
    #[inline]
    pub fn get_type_coercion(&self) -> SqlType {
        self.list
            .pending(self.index)
            .and_then(|c| c.get())
            .unwrap_or_else(|| self.value().as_type())
    }

    /// Ask the server to convert this argument before `process`
    ///
    /// Takes effect once `init` returns successfully.
    #[inline]
    pub fn set_type_coercion(&mut self, newtype: SqlType) {
        if let Some(cell) = self.list.pending(self.index) {
            cell.set(Some(newtype));
        }
    }
}

impl<'a, S: UdfState> fmt::Debug for SqlArg<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlArg")
            .field("value", &self.value())
            .field("attribute", &self.attribute())
            .field("maybe_null", &self.maybe_null())
            .finish()
    }
}
