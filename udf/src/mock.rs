//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
#![allow(clippy::new_without_default)]
//! Stand-ins for the server's structures, for unit testing functions without a server
//!
//! Enabled with the `mock` feature. Nothing here is meant for use outside of tests.
//!
//! ```
//! # #[cfg(feature = "mock")] {
//! use udf::mock::*;
//! use udf::mock_args;
//! use udf::prelude::*;
//!
//! struct Prefix;
//!
//! impl BasicUdf for Prefix {
//!     type Returns<'a> = String;
//!
//!     fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
//!         assert_eq!(args.get(1).unwrap().attribute(), "n");
//!         cfg.set_max_len(64);
//!         Ok(Self)
//!     }
//!
//!     fn process<'a>(
//!         &'a mut self,
//!         _cfg: &UdfCfg<Process>,
//!         args: &ArgList<Process>,
//!         _error: Option<NonZeroU8>,
//!     ) -> Result<Self::Returns<'a>, ProcessError> {
//!         let s = args.get(0).unwrap().value();
//!         let s = s.as_string().ok_or(ProcessError)?;
//!         let n = args.get(1).unwrap().value().as_int().ok_or(ProcessError)?;
//!         Ok(s.chars().take(n as usize).collect())
//!     }
//! }
//!
//! let mut cfg = MockUdfCfg::new();
//! let mut args = mock_args![("input value", "s", false), (5, "n", false)];
//!
//! let mut udf = Prefix::init(cfg.as_init(), &args.as_init()).unwrap();
//! assert_eq!(*cfg.max_len(), 64);
//!
//! let res = udf.process(cfg.as_process(), &args.as_process(), None).unwrap();
//! assert_eq!(res, "input");
//! # }
//! ```
use std::cell::UnsafeCell;
use std::ffi::{c_char, c_uint, c_ulong};
use std::ptr;

use udf_sys::{Item_result, UDF_ARGS, UDF_INIT};

use crate::types::{ArgList, Init, Process, SqlType, UdfCfg, UdfState};
#[doc(inline)]
pub use crate::mock_args;

/// Owns a `UDF_INIT` and hands out [`UdfCfg`] views of it
#[derive(Debug)]
pub struct MockUdfCfg {
    inner: UnsafeCell<UDF_INIT>,
}

impl MockUdfCfg {
    pub fn new() -> Self {
        Self {
            inner: UnsafeCell::new(UDF_INIT {
                maybe_null: false,
                decimals: 0,
                max_length: 0,
                ptr: ptr::null_mut(),
                const_item: false,
                extension: ptr::null_mut(),
            }),
        }
    }

    /// The view `init` receives
    pub fn as_init(&mut self) -> &UdfCfg<Init> {
        // SAFETY: owned by `self`, which stays borrowed as long as the view
        unsafe { UdfCfg::from_raw_ptr(self.inner.get()) }
    }

    /// The view `process`, `clear` and `add` receive
    pub fn as_process(&mut self) -> &UdfCfg<Process> {
        // SAFETY: as above
        unsafe { UdfCfg::from_raw_ptr(self.inner.get()) }
    }

    pub fn maybe_null(&mut self) -> &mut bool {
        &mut self.inner.get_mut().maybe_null
    }

    pub fn decimals(&mut self) -> &mut c_uint {
        &mut self.inner.get_mut().decimals
    }

    pub fn max_len(&mut self) -> &mut c_ulong {
        &mut self.inner.get_mut().max_length
    }

    pub fn is_const(&mut self) -> &mut bool {
        &mut self.inner.get_mut().const_item
    }

    /// Pointer to pass to the `extern "C"` callbacks
    #[doc(hidden)]
    pub fn as_raw_ptr(&mut self) -> *mut UDF_INIT {
        self.inner.get()
    }

    /// The boxed state, null before a successful `init` and after `deinit`
    #[doc(hidden)]
    pub fn state_ptr(&self) -> *mut c_char {
        // SAFETY: no other borrow of `inner` is live while `&self` is
        unsafe { (*self.inner.get()).ptr }
    }
}

/// The value of a [`MockArg`]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MockArgData {
    String(Option<String>),
    Bytes(Option<Vec<u8>>),
    Real(Option<f64>),
    Int(Option<i64>),
    Decimal(Option<String>),
}

impl MockArgData {
    fn item_result(&self) -> Item_result {
        match self {
            Self::String(_) | Self::Bytes(_) => Item_result::STRING_RESULT,
            Self::Real(_) => Item_result::REAL_RESULT,
            Self::Int(_) => Item_result::INT_RESULT,
            Self::Decimal(_) => Item_result::DECIMAL_RESULT,
        }
    }

    /// Pointer and length as the server would pass them
    fn raw_parts(&self) -> (*const c_char, c_ulong) {
        fn bytes(v: Option<&[u8]>) -> (*const c_char, c_ulong) {
            v.map_or((ptr::null(), 0), |b| (b.as_ptr().cast(), b.len() as c_ulong))
        }

        match self {
            Self::String(v) | Self::Decimal(v) => bytes(v.as_deref().map(str::as_bytes)),
            Self::Bytes(v) => bytes(v.as_deref()),
            Self::Real(v) => (v.as_ref().map_or(ptr::null(), |r| (r as *const f64).cast()), 0),
            Self::Int(v) => (v.as_ref().map_or(ptr::null(), |i| (i as *const i64).cast()), 0),
        }
    }
}

macro_rules! mock_arg_data_from {
    ($($from:ty => |$v:ident| $e:expr);* $(;)?) => {
        $(impl From<$from> for MockArgData {
            #[inline]
            fn from($v: $from) -> Self {
                $e
            }
        })*
    }
}

mock_arg_data_from! {
    &str => |v| Self::String(Some(v.to_owned()));
    Option<&str> => |v| Self::String(v.map(ToOwned::to_owned));
    String => |v| Self::String(Some(v));
    &[u8] => |v| Self::Bytes(Some(v.to_owned()));
    Option<&[u8]> => |v| Self::Bytes(v.map(ToOwned::to_owned));
    Vec<u8> => |v| Self::Bytes(Some(v));
    i64 => |v| Self::Int(Some(v));
    Option<i64> => |v| Self::Int(v);
    f64 => |v| Self::Real(Some(v));
    Option<f64> => |v| Self::Real(v);
}

/// One argument: its value, the attribute (query text) it was written as, and whether it
/// may be `NULL`
#[derive(Debug, Clone, PartialEq)]
pub struct MockArg {
    pub value: MockArgData,
    pub attribute: String,
    pub maybe_null: bool,
}

impl MockArg {
    #[inline]
    pub fn new(value: MockArgData, attribute: &str, maybe_null: bool) -> Self {
        Self { value, attribute: attribute.to_owned(), maybe_null }
    }
}

/// The arrays a `UDF_ARGS` points into, rebuilt from the [`MockArg`]s on every use
#[derive(Debug, Default)]
struct Built {
    arg_types: Vec<Item_result>,
    args: Vec<*const c_char>,
    lengths: Vec<c_ulong>,
    maybe_null: Vec<c_char>,
    attributes: Vec<*const c_char>,
    attribute_lengths: Vec<c_ulong>,
}

/// Owns a list of [`MockArg`]s and hands out [`ArgList`] views of them
///
/// Usually made with [`mock_args!`](crate::mock_args).
#[derive(Debug)]
pub struct MockArgList {
    args: Vec<MockArg>,
    built: Built,
    raw: UDF_ARGS,
}

impl MockArgList {
    pub fn new(args: Vec<MockArg>) -> Self {
        let mut ret = Self {
            args,
            built: Built::default(),
            raw: UDF_ARGS {
                arg_count: 0,
                arg_types: ptr::null_mut(),
                args: ptr::null(),
                lengths: ptr::null(),
                maybe_null: ptr::null(),
                attributes: ptr::null(),
                attribute_lengths: ptr::null(),
                extension: ptr::null(),
            },
        };
        ret.build();
        ret
    }

    pub fn push_arg(&mut self, arg: MockArg) {
        self.args.push(arg);
        self.build();
    }

    /// Change an argument, as a new row would
    pub fn arg_mut(&mut self, index: usize) -> Option<&mut MockArg> {
        self.args.get_mut(index)
    }

    fn build(&mut self) {
        let mut built = Built::default();
        for arg in &self.args {
            let (ptr, len) = arg.value.raw_parts();
            built.arg_types.push(arg.value.item_result());
            built.args.push(ptr);
            built.lengths.push(len);
            built.maybe_null.push(c_char::from(arg.maybe_null));
            built.attributes.push(arg.attribute.as_ptr().cast());
            built.attribute_lengths.push(arg.attribute.len() as c_ulong);
        }

        self.raw = UDF_ARGS {
            arg_count: built.args.len() as c_uint,
            arg_types: built.arg_types.as_mut_ptr(),
            args: built.args.as_ptr(),
            lengths: built.lengths.as_ptr(),
            maybe_null: built.maybe_null.as_ptr(),
            attributes: built.attributes.as_ptr(),
            attribute_lengths: built.attribute_lengths.as_ptr(),
            extension: ptr::null(),
        };
        self.built = built;
    }

    fn view<S: UdfState>(&mut self) -> ArgList<'_, S> {
        self.build();
        // SAFETY: every array points into `self`, which stays borrowed as long as the view
        unsafe { ArgList::from_raw_ptr(&mut self.raw) }
    }

    /// The view `init` receives
    pub fn as_init(&mut self) -> ArgList<'_, Init> {
        self.view()
    }

    /// The view `process` and `add` receive
    pub fn as_process(&mut self) -> ArgList<'_, Process> {
        self.view()
    }

    /// Types as last seen by the server, including coercions written back by `init`
    pub fn arg_types(&self) -> Vec<SqlType> {
        self.built.arg_types.iter().filter_map(|t| SqlType::try_from(*t).ok()).collect()
    }

    /// Pointer to pass to the `extern "C"` callbacks
    #[doc(hidden)]
    pub fn as_raw_ptr(&mut self) -> *mut UDF_ARGS {
        self.build();
        &mut self.raw
    }
}

impl From<Vec<MockArg>> for MockArgList {
    fn from(args: Vec<MockArg>) -> Self {
        Self::new(args)
    }
}

impl<const N: usize> From<[MockArg; N]> for MockArgList {
    fn from(args: [MockArg; N]) -> Self {
        Self::new(args.into())
    }
}

/// Build a [`MockArgList`](crate::mock::MockArgList)
///
/// Each argument is `(value, attribute, maybe_null)`. The type comes from the value's `From`
/// impl, or can be named as a [`MockArgData`](crate::mock::MockArgData) variant. `None`
/// needs a type. A value that starts with a name followed by more tokens, like `f(x)`, must
/// be written with its type or in parentheses.
///
/// ```
/// # #[cfg(feature = "mock")] {
/// use udf::mock_args;
///
/// // select f(id, 'some string', 1000 as value, 1.234, NULL) from t
/// let mut args = mock_args![
///     (1, "id", false),
///     ("some string", "'some string'", false),
///     (Int 1000, "value", false),
///     (Decimal "1.234", "1.234", false),
///     (String None, "NULL", true),
/// ];
/// assert_eq!(args.as_init().len(), 5);
/// # }
/// ```
#[macro_export]
macro_rules! mock_args {
    (@arg $kind:ident None, $attr:expr, $nullable:expr) => {
        $crate::mock::MockArg::new($crate::mock::MockArgData::$kind(None), $attr, $nullable)
    };
    (@arg $kind:ident $val:expr, $attr:expr, $nullable:expr) => {
        $crate::mock::MockArg::new(
            $crate::mock::MockArgData::$kind(Some(::core::convert::From::from($val))),
            $attr,
            $nullable,
        )
    };
    (@arg $($val:tt)*) => {
        $crate::mock_args!(@value $($val)*)
    };
    (@value $val:expr, $attr:expr, $nullable:expr) => {
        $crate::mock::MockArg::new($crate::mock::MockArgData::from($val), $attr, $nullable)
    };
    ($(($($arg:tt)*)),* $(,)?) => {
        $crate::mock::MockArgList::new(::std::vec![$($crate::mock_args!(@arg $($arg)*)),*])
    };
}
