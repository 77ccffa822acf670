//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::cell::Cell;
use std::ffi::c_int;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use udf_sys::UDF_ARGS;

use crate::types::{Init, SqlArg, SqlType, SqlTypeError, UdfState};

/// The arguments of one call, a view over `UDF_ARGS`
///
/// Borrowed from the server for the duration of a single callback.
pub struct ArgList<'a, S: UdfState> {
    raw: NonNull<UDF_ARGS>,
    /// Coercions requested during `init`, written back by `flush_all_coercions`
    pending: Vec<Cell<Option<SqlType>>>,
    _marker: PhantomData<(&'a UDF_ARGS, S)>,
}

impl<'a, S: UdfState> ArgList<'a, S> {
    /// # Safety
    ///
    /// `ptr` must point to a `UDF_ARGS` whose arrays all have `arg_count` valid entries, for
    /// `'a`.
    #[inline]
    pub(crate) unsafe fn from_raw_ptr(ptr: *mut UDF_ARGS) -> Self {
        // SAFETY: the caller promises `ptr` is valid, so also non-null
        let raw = unsafe { NonNull::new_unchecked(ptr) };
        // SAFETY: as above
        let count = unsafe { raw.as_ref().arg_count as usize };
        let pending = if S::ACCEPTS_COERCIONS {
            (0..count).map(|_| Cell::new(None)).collect()
        } else {
            Vec::new()
        };
        Self { raw, pending, _marker: PhantomData }
    }

    #[inline]
    pub(crate) fn raw(&self) -> &UDF_ARGS {
        // SAFETY: valid for `'a` by construction
        unsafe { self.raw.as_ref() }
    }

    #[inline]
    pub(crate) fn pending(&self, index: usize) -> Option<&Cell<Option<SqlType>>> {
        self.pending.get(index)
    }

    /// Number of arguments
    #[inline]
    pub fn len(&self) -> usize {
        self.raw().arg_count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The argument at `index`, or `None` past the end
    #[inline]
    pub fn get(&self, index: usize) -> Option<SqlArg<'_, S>> {
        if index >= self.len() {
            return None;
        }
        Some(SqlArg::new(self, index))
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, S> {
        Iter { list: self, n: 0 }
    }

    /// Collect every argument
    #[inline]
    pub fn as_vec(&self) -> Vec<SqlArg<'_, S>> {
        self.iter().collect()
    }

    /// Check every argument has a type a UDF can receive
    pub(crate) fn check_types(&self) -> Result<(), SqlTypeError> {
        let raw = self.raw();
        for i in 0..self.len() {
            // SAFETY: `i` is in bounds. Read as an integer, the server may send any tag.
            let tag = unsafe { *raw.arg_types.add(i).cast::<c_int>() };
            SqlType::try_from(tag)?;
        }
        Ok(())
    }
}

impl<'a> ArgList<'a, Init> {
    /// Write every pending coercion into the server's type array
    ///
    /// Runs after a successful `init`, so values read during `init` keep their original
    /// types.
    #[doc(hidden)]
    pub fn flush_all_coercions(&self) {
        let raw = self.raw();
        for (i, cell) in self.pending.iter().enumerate() {
            if let Some(ty) = cell.take() {
                // SAFETY: `i` is in bounds and `arg_types` is writable during init
                unsafe { *raw.arg_types.add(i) = ty.to_item_result() };
            }
        }
    }
}

impl<'a, S: UdfState> fmt::Debug for ArgList<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgList").field("items", &self.as_vec()).finish()
    }
}

impl<'b, 'a, S: UdfState> IntoIterator for &'b ArgList<'a, S> {
    type Item = SqlArg<'b, S>;
    type IntoIter = Iter<'b, S>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`ArgList`]
#[derive(Debug)]
pub struct Iter<'b, S: UdfState> {
    list: &'b ArgList<'b, S>,
    n: usize,
}

impl<'b, S: UdfState> Iterator for Iter<'b, S> {
    type Item = SqlArg<'b, S>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let ret = self.list.get(self.n)?;
        self.n += 1;
        Some(ret)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len() - self.n;
        (remaining, Some(remaining))
    }
}

impl<'b, S: UdfState> ExactSizeIterator for Iter<'b, S> {}
