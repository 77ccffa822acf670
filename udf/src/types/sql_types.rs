//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::{slice, str};

use udf_sys::{InvalidItemResult, Item_result};

/// The four types a UDF argument or result can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(i8)]
pub enum SqlType {
    String = Item_result::STRING_RESULT as i8,
    Real = Item_result::REAL_RESULT as i8,
    Int = Item_result::INT_RESULT as i8,
    Decimal = Item_result::DECIMAL_RESULT as i8,
}

/// A type tag that no UDF argument can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SqlTypeError {
    #[error("`{0:?}` is not a valid argument type")]
    Unsupported(Item_result),
    #[error(transparent)]
    InvalidTag(#[from] InvalidItemResult),
}

impl SqlType {
    #[inline]
    pub fn to_item_result(self) -> Item_result {
        match self {
            Self::String => Item_result::STRING_RESULT,
            Self::Real => Item_result::REAL_RESULT,
            Self::Int => Item_result::INT_RESULT,
            Self::Decimal => Item_result::DECIMAL_RESULT,
        }
    }

    #[inline]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Real => "real",
            Self::Int => "int",
            Self::Decimal => "decimal",
        }
    }
}

impl TryFrom<Item_result> for SqlType {
    type Error = SqlTypeError;

    #[inline]
    fn try_from(tag: Item_result) -> Result<Self, Self::Error> {
        match tag {
            Item_result::STRING_RESULT => Ok(Self::String),
            Item_result::REAL_RESULT => Ok(Self::Real),
            Item_result::INT_RESULT => Ok(Self::Int),
            Item_result::DECIMAL_RESULT => Ok(Self::Decimal),
            other => Err(SqlTypeError::Unsupported(other)),
        }
    }
}

impl TryFrom<i32> for SqlType {
    type Error = SqlTypeError;

    #[inline]
    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        Self::try_from(Item_result::try_from(tag)?)
    }
}

impl From<&SqlResult<'_>> for SqlType {
    #[inline]
    fn from(value: &SqlResult<'_>) -> Self {
        value.as_type()
    }
}

/// A typed, possibly `NULL`, argument value
///
/// Strings are bytes: nothing guarantees they are UTF-8. Use [`SqlResult::as_string`] to get
/// a `&str` when they are. Decimals arrive as their text form, which always is.
///
/// During `init` a `None` means the argument is not a constant, rather than `NULL`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SqlResult<'a> {
    String(Option<&'a [u8]>),
    Real(Option<f64>),
    Int(Option<i64>),
    Decimal(Option<&'a str>),
}

impl<'a> SqlResult<'a> {
    /// Read a value the server put behind `ptr`
    ///
    /// # Safety
    ///
    /// If `ptr` is not null it must point to an `i64` or `f64` for numeric tags, or to `len`
    /// readable bytes for string and decimal tags, valid for `'a`.
    pub(crate) unsafe fn from_ptr(
        ptr: *const u8,
        tag: Item_result,
        len: usize,
    ) -> Result<Self, SqlTypeError> {
        let ty = SqlType::try_from(tag)?;

        if ptr.is_null() {
            return Ok(match ty {
                SqlType::String => Self::String(None),
                SqlType::Real => Self::Real(None),
                SqlType::Int => Self::Int(None),
                SqlType::Decimal => Self::Decimal(None),
            });
        }

        // SAFETY: tag and length are the caller's promise. Numbers are not guaranteed to be
        // aligned so they are read unaligned.
        let value = unsafe {
            match ty {
                SqlType::String => Self::String(Some(slice::from_raw_parts(ptr, len))),
                SqlType::Real => Self::Real(Some(ptr.cast::<f64>().read_unaligned())),
                SqlType::Int => Self::Int(Some(ptr.cast::<i64>().read_unaligned())),
                SqlType::Decimal => {
                    let bytes = slice::from_raw_parts(ptr, len);
                    match str::from_utf8(bytes) {
                        Ok(s) => Self::Decimal(Some(s)),
                        // a decimal is ASCII, anything else is handed over as plain bytes
                        Err(_) => Self::String(Some(bytes)),
                    }
                }
            }
        };

        Ok(value)
    }

    #[inline]
    pub fn as_type(&self) -> SqlType {
        match self {
            Self::String(_) => SqlType::String,
            Self::Real(_) => SqlType::Real,
            Self::Int(_) => SqlType::Int,
            Self::Decimal(_) => SqlType::Decimal,
        }
    }

    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.as_type().display_name()
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    #[inline]
    pub fn is_decimal(&self) -> bool {
        matches!(self, Self::Decimal(_))
    }

    /// True if there is no value, whatever the type
    #[inline]
    pub fn is_null(&self) -> bool {
        match self {
            Self::String(v) => v.is_none(),
            Self::Real(v) => v.is_none(),
            Self::Int(v) => v.is_none(),
            Self::Decimal(v) => v.is_none(),
        }
    }

    /// The value if this is a non-null integer
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => v,
            _ => None,
        }
    }

    /// The value if this is a non-null real
    #[inline]
    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Self::Real(v) => v,
            _ => None,
        }
    }

    /// The value if this is a non-null string holding valid UTF-8, or a non-null decimal
    ///
    /// Wrong type, `NULL` and invalid UTF-8 all give `None`. Match on the variant if the
    /// difference matters.
    #[inline]
    pub fn as_string(&self) -> Option<&'a str> {
        match *self {
            Self::String(Some(v)) => str::from_utf8(v).ok(),
            Self::Decimal(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// The raw bytes of a non-null string or decimal
    #[inline]
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Self::String(Some(v)) => Some(v),
            Self::Decimal(Some(v)) => Some(v.as_bytes()),
            _ => None,
        }
    }
}
