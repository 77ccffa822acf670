//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! The UDF callbacks described as data.
//!
//! A server stores every symbol it resolves as an untyped [`Udf_func_any`] and decides how to
//! call the process function from the return type declared in `CREATE FUNCTION ... RETURNS`.
//! [`UdfCallback`] is that tagged slot, and [`UdfSymbols`] is the full set belonging to one
//! registered function.
use crate::{
    Item_result, Item_udftype, UdfAddFn, UdfAnyFn, UdfClearFn, UdfDeinitFn, UdfDoubleFn,
    UdfInitFn, UdfLongLongFn, UdfStringFn, Udf_func_any,
};
use std::fmt;

/// One of the eight callback aliases
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CallbackKind {
    Init,
    Deinit,
    Clear,
    Add,
    Double,
    LongLong,
    String,
    Any,
}

/// Category of a single callback parameter, in declaration order
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ParamKind {
    /// `*mut UDF_INIT`
    Context,
    /// `*mut UDF_ARGS`
    Args,
    /// `*mut c_char` of `MYSQL_ERRMSG_SIZE` bytes
    ErrorMessage,
    /// `*mut c_char` of `MYSQL_RESULT_BUFFER_SIZE` bytes
    ResultBuffer,
    /// `*mut c_ulong`, capacity in and length out
    Length,
    /// `*mut c_uchar`
    IsNull,
    /// `*mut c_uchar`
    Error,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 8] = [
        Self::Init,
        Self::Deinit,
        Self::Clear,
        Self::Add,
        Self::Double,
        Self::LongLong,
        Self::String,
        Self::Any,
    ];

    /// Parameters this kind of callback is invoked with
    pub const fn params(self) -> &'static [ParamKind] {
        use ParamKind::*;
        match self {
            Self::Init => &[Context, Args, ErrorMessage],
            Self::Deinit => &[Context],
            Self::Clear => &[Context, IsNull, Error],
            Self::Add | Self::Double | Self::LongLong => &[Context, Args, IsNull, Error],
            Self::String => &[Context, Args, ResultBuffer, Length, IsNull, Error],
            Self::Any => &[],
        }
    }

    /// Only `init` reports success or failure through its return value
    pub const fn returns_status(self) -> bool {
        matches!(self, Self::Init)
    }

    /// Only string results report a length
    pub const fn has_length_out(self) -> bool {
        matches!(self, Self::String)
    }

    /// `Any` is a storage type and is never called
    pub const fn is_invocable(self) -> bool {
        !matches!(self, Self::Any)
    }

    /// Whether this kind produces the function's value
    pub const fn is_process(self) -> bool {
        matches!(self, Self::Double | Self::LongLong | Self::String)
    }

    /// Suffix appended to the function name to form the exported symbol
    ///
    /// `None` for process functions (exported under the bare name) and for `Any`.
    pub const fn symbol_suffix(self) -> Option<&'static str> {
        match self {
            Self::Init => Some("_init"),
            Self::Deinit => Some("_deinit"),
            Self::Clear => Some("_clear"),
            Self::Add => Some("_add"),
            Self::Double | Self::LongLong | Self::String | Self::Any => None,
        }
    }

    /// Process callback kind for a declared return type
    pub const fn process_kind_for(returns: Item_result) -> Option<CallbackKind> {
        match returns {
            Item_result::REAL_RESULT => Some(Self::Double),
            Item_result::INT_RESULT => Some(Self::LongLong),
            Item_result::STRING_RESULT | Item_result::DECIMAL_RESULT => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Deinit => "deinit",
            Self::Clear => "clear",
            Self::Add => "add",
            Self::Double => "double",
            Self::LongLong => "longlong",
            Self::String => "string",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// A non-null callback tagged with its kind
#[derive(Debug, Clone, Copy)]
pub enum UdfCallback {
    Init(UdfInitFn),
    Deinit(UdfDeinitFn),
    Clear(UdfClearFn),
    Add(UdfAddFn),
    Double(UdfDoubleFn),
    LongLong(UdfLongLongFn),
    String(UdfStringFn),
    Any(UdfAnyFn),
}

impl UdfCallback {
    pub const fn kind(&self) -> CallbackKind {
        match self {
            Self::Init(_) => CallbackKind::Init,
            Self::Deinit(_) => CallbackKind::Deinit,
            Self::Clear(_) => CallbackKind::Clear,
            Self::Add(_) => CallbackKind::Add,
            Self::Double(_) => CallbackKind::Double,
            Self::LongLong(_) => CallbackKind::LongLong,
            Self::String(_) => CallbackKind::String,
            Self::Any(_) => CallbackKind::Any,
        }
    }

    /// Forget the signature, keeping only the address
    pub fn erase(self) -> Udf_func_any {
        // SAFETY: all function pointers share one representation. The result is only ever
        // called again after `from_erased` restores the original signature.
        let any = unsafe {
            match self {
                Self::Init(f) => std::mem::transmute::<UdfInitFn, UdfAnyFn>(f),
                Self::Deinit(f) => std::mem::transmute::<UdfDeinitFn, UdfAnyFn>(f),
                Self::Clear(f) => std::mem::transmute::<UdfClearFn, UdfAnyFn>(f),
                Self::Add(f) => std::mem::transmute::<UdfAddFn, UdfAnyFn>(f),
                Self::Double(f) => std::mem::transmute::<UdfDoubleFn, UdfAnyFn>(f),
                Self::LongLong(f) => std::mem::transmute::<UdfLongLongFn, UdfAnyFn>(f),
                Self::String(f) => std::mem::transmute::<UdfStringFn, UdfAnyFn>(f),
                Self::Any(f) => f,
            }
        };
        Some(any)
    }

    /// Restore a typed callback from an erased slot. Returns `None` for an empty slot.
    ///
    /// # Safety
    ///
    /// `any` must have been produced from a function with the signature `kind` describes.
    pub unsafe fn from_erased(kind: CallbackKind, any: Udf_func_any) -> Option<UdfCallback> {
        let f = any?;
        // SAFETY: the caller guarantees `f` really has the signature of `kind`
        let cb = unsafe {
            match kind {
                CallbackKind::Init => Self::Init(std::mem::transmute::<UdfAnyFn, UdfInitFn>(f)),
                CallbackKind::Deinit => {
                    Self::Deinit(std::mem::transmute::<UdfAnyFn, UdfDeinitFn>(f))
                }
                CallbackKind::Clear => Self::Clear(std::mem::transmute::<UdfAnyFn, UdfClearFn>(f)),
                CallbackKind::Add => Self::Add(std::mem::transmute::<UdfAnyFn, UdfAddFn>(f)),
                CallbackKind::Double => {
                    Self::Double(std::mem::transmute::<UdfAnyFn, UdfDoubleFn>(f))
                }
                CallbackKind::LongLong => {
                    Self::LongLong(std::mem::transmute::<UdfAnyFn, UdfLongLongFn>(f))
                }
                CallbackKind::String => {
                    Self::String(std::mem::transmute::<UdfAnyFn, UdfStringFn>(f))
                }
                CallbackKind::Any => Self::Any(f),
            }
        };
        Some(cb)
    }
}

/// The value-producing callback of a function, chosen by its SQL return type
#[derive(Debug, Clone, Copy)]
pub enum ProcessCallback {
    Double(UdfDoubleFn),
    LongLong(UdfLongLongFn),
    String(UdfStringFn),
}

impl ProcessCallback {
    pub const fn kind(&self) -> CallbackKind {
        match self {
            Self::Double(_) => CallbackKind::Double,
            Self::LongLong(_) => CallbackKind::LongLong,
            Self::String(_) => CallbackKind::String,
        }
    }
}

impl From<ProcessCallback> for UdfCallback {
    fn from(value: ProcessCallback) -> Self {
        match value {
            ProcessCallback::Double(f) => Self::Double(f),
            ProcessCallback::LongLong(f) => Self::LongLong(f),
            ProcessCallback::String(f) => Self::String(f),
        }
    }
}

impl TryFrom<UdfCallback> for ProcessCallback {
    type Error = SymbolError;

    fn try_from(value: UdfCallback) -> Result<Self, Self::Error> {
        match value {
            UdfCallback::Double(f) => Ok(Self::Double(f)),
            UdfCallback::LongLong(f) => Ok(Self::LongLong(f)),
            UdfCallback::String(f) => Ok(Self::String(f)),
            other => Err(SymbolError::NotAProcessCallback(other.kind())),
        }
    }
}

/// Problems with a set of resolved symbols
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("function `{0}` has no process symbol")]
    MissingProcess(String),
    #[error("aggregate function `{0}` has no `{0}{1}` symbol")]
    MissingAggregateCallback(String, &'static str),
    #[error("`{0}` is not an aggregate but exports `{0}{1}`")]
    UnexpectedAggregateCallback(String, &'static str),
    #[error("`{0}` cannot be used as a return type")]
    InvalidReturnType(String),
    #[error("a `{0}` callback does not produce a value")]
    NotAProcessCallback(CallbackKind),
}

/// Every callback that belongs to one registered function
#[derive(Debug, Clone)]
pub struct UdfSymbols {
    pub name: String,
    pub udftype: Item_udftype,
    pub init: Option<UdfInitFn>,
    pub deinit: Option<UdfDeinitFn>,
    pub process: Option<ProcessCallback>,
    pub clear: Option<UdfClearFn>,
    pub add: Option<UdfAddFn>,
    /// MariaDB only, for aggregates used as window functions
    pub remove: Option<UdfAddFn>,
}

impl UdfSymbols {
    pub fn new(name: impl Into<String>, udftype: Item_udftype) -> Self {
        Self {
            name: name.into(),
            udftype,
            init: None,
            deinit: None,
            process: None,
            clear: None,
            add: None,
            remove: None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.udftype == Item_udftype::UDFTYPE_AGGREGATE
    }

    /// Check the set has what its function type requires
    ///
    /// `init` and `deinit` are optional. A process function is not.
    pub fn validate(&self) -> Result<(), SymbolError> {
        if self.process.is_none() {
            return Err(SymbolError::MissingProcess(self.name.clone()));
        }

        if self.is_aggregate() {
            if self.clear.is_none() {
                return Err(SymbolError::MissingAggregateCallback(self.name.clone(), "_clear"));
            }
            if self.add.is_none() {
                return Err(SymbolError::MissingAggregateCallback(self.name.clone(), "_add"));
            }
        } else {
            if self.clear.is_some() {
                return Err(SymbolError::UnexpectedAggregateCallback(self.name.clone(), "_clear"));
            }
            if self.add.is_some() {
                return Err(SymbolError::UnexpectedAggregateCallback(self.name.clone(), "_add"));
            }
        }

        Ok(())
    }

    /// Build the symbol set for `name` from a lookup of exported symbols
    ///
    /// Aggregate callbacks are only looked up for aggregate functions. The result is validated.
    ///
    /// # Safety
    ///
    /// Each symbol `lookup` returns must have the signature its suffix implies, and the bare
    /// `name` must have the process signature for `returns`.
    pub unsafe fn resolve<F>(
        name: &str,
        udftype: Item_udftype,
        returns: Item_result,
        mut lookup: F,
    ) -> Result<Self, SymbolError>
    where
        F: FnMut(&str) -> Udf_func_any,
    {
        let process_kind = CallbackKind::process_kind_for(returns)
            .ok_or_else(|| SymbolError::InvalidReturnType(format!("{returns:?}")))?;

        let mut syms = Self::new(name, udftype);

        // SAFETY: signatures are guaranteed by the caller
        unsafe {
            syms.process = match UdfCallback::from_erased(process_kind, lookup(name)) {
                Some(cb) => Some(ProcessCallback::try_from(cb)?),
                None => None,
            };
            syms.init = match UdfCallback::from_erased(
                CallbackKind::Init,
                lookup(&format!("{name}_init")),
            ) {
                Some(UdfCallback::Init(f)) => Some(f),
                _ => None,
            };
            syms.deinit = match UdfCallback::from_erased(
                CallbackKind::Deinit,
                lookup(&format!("{name}_deinit")),
            ) {
                Some(UdfCallback::Deinit(f)) => Some(f),
                _ => None,
            };

            if syms.is_aggregate() {
                syms.clear = match UdfCallback::from_erased(
                    CallbackKind::Clear,
                    lookup(&format!("{name}_clear")),
                ) {
                    Some(UdfCallback::Clear(f)) => Some(f),
                    _ => None,
                };
                syms.add = match UdfCallback::from_erased(
                    CallbackKind::Add,
                    lookup(&format!("{name}_add")),
                ) {
                    Some(UdfCallback::Add(f)) => Some(f),
                    _ => None,
                };
                syms.remove = match UdfCallback::from_erased(
                    CallbackKind::Add,
                    lookup(&format!("{name}_remove")),
                ) {
                    Some(UdfCallback::Add(f)) => Some(f),
                    _ => None,
                };
            }
        }

        syms.validate()?;
        Ok(syms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UDF_ARGS, UDF_INIT};
    use std::collections::HashMap;
    use std::ffi::{c_char, c_double, c_longlong, c_uchar};
    use std::ptr::null_mut;

    unsafe extern "C" fn t_init(_: *mut UDF_INIT, _: *mut UDF_ARGS, _: *mut c_char) -> bool {
        false
    }
    unsafe extern "C" fn t_deinit(_: *mut UDF_INIT) {}
    unsafe extern "C" fn t_clear(_: *mut UDF_INIT, _: *mut c_uchar, _: *mut c_uchar) {}
    unsafe extern "C" fn t_add(
        _: *mut UDF_INIT,
        _: *mut UDF_ARGS,
        _: *mut c_uchar,
        _: *mut c_uchar,
    ) {
    }
    unsafe extern "C" fn t_double(
        _: *mut UDF_INIT,
        _: *mut UDF_ARGS,
        _: *mut c_uchar,
        _: *mut c_uchar,
    ) -> c_double {
        1.5
    }
    unsafe extern "C" fn t_longlong(
        _: *mut UDF_INIT,
        _: *mut UDF_ARGS,
        _: *mut c_uchar,
        _: *mut c_uchar,
    ) -> c_longlong {
        42
    }

    #[test]
    fn param_shapes() {
        use ParamKind::*;
        assert_eq!(CallbackKind::Init.params(), &[Context, Args, ErrorMessage]);
        assert_eq!(CallbackKind::Deinit.params(), &[Context]);
        assert_eq!(CallbackKind::Clear.params(), &[Context, IsNull, Error]);
        assert_eq!(CallbackKind::Add.params(), &[Context, Args, IsNull, Error]);
        assert_eq!(CallbackKind::Double.params(), CallbackKind::LongLong.params());
        assert_eq!(
            CallbackKind::String.params(),
            &[Context, Args, ResultBuffer, Length, IsNull, Error]
        );
        assert!(CallbackKind::Any.params().is_empty());
    }

    #[test]
    fn every_invocable_kind_takes_context_first() {
        for kind in CallbackKind::ALL.into_iter().filter(|k| k.is_invocable()) {
            assert_eq!(kind.params().first(), Some(&ParamKind::Context), "{kind}");
        }
    }

    #[test]
    fn only_init_returns_status_and_only_string_has_length() {
        for kind in CallbackKind::ALL {
            assert_eq!(kind.returns_status(), kind == CallbackKind::Init, "{kind}");
            assert_eq!(kind.has_length_out(), kind == CallbackKind::String, "{kind}");
            assert_eq!(kind.params().contains(&ParamKind::Length), kind.has_length_out());
        }
        assert!(!CallbackKind::Any.is_invocable());
    }

    #[test]
    fn process_kind_from_return_type() {
        assert_eq!(
            CallbackKind::process_kind_for(Item_result::REAL_RESULT),
            Some(CallbackKind::Double)
        );
        assert_eq!(
            CallbackKind::process_kind_for(Item_result::INT_RESULT),
            Some(CallbackKind::LongLong)
        );
        assert_eq!(
            CallbackKind::process_kind_for(Item_result::DECIMAL_RESULT),
            Some(CallbackKind::String)
        );
        assert_eq!(CallbackKind::process_kind_for(Item_result::ROW_RESULT), None);
        assert_eq!(CallbackKind::process_kind_for(Item_result::INVALID_RESULT), None);
    }

    #[test]
    fn erase_and_restore() {
        let cb = UdfCallback::LongLong(t_longlong);
        let any = cb.erase();
        assert!(any.is_some());
        let back = unsafe { UdfCallback::from_erased(CallbackKind::LongLong, any) };
        let Some(UdfCallback::LongLong(f)) = back else { panic!("wrong variant: {back:?}") };
        let v = unsafe { f(null_mut(), null_mut(), null_mut(), null_mut()) };
        assert_eq!(v, 42);

        assert!(unsafe { UdfCallback::from_erased(CallbackKind::Init, None) }.is_none());
    }

    #[test]
    fn process_callback_conversion() {
        let cb: UdfCallback = ProcessCallback::Double(t_double).into();
        assert_eq!(cb.kind(), CallbackKind::Double);
        assert!(ProcessCallback::try_from(cb).is_ok());
        assert_eq!(
            ProcessCallback::try_from(UdfCallback::Deinit(t_deinit)).err(),
            Some(SymbolError::NotAProcessCallback(CallbackKind::Deinit))
        );
    }

    #[test]
    fn validate_rules() {
        let mut syms = UdfSymbols::new("f", Item_udftype::UDFTYPE_FUNCTION);
        assert_eq!(syms.validate(), Err(SymbolError::MissingProcess("f".into())));

        syms.process = Some(ProcessCallback::LongLong(t_longlong));
        assert_eq!(syms.validate(), Ok(()));

        syms.add = Some(t_add);
        assert_eq!(
            syms.validate(),
            Err(SymbolError::UnexpectedAggregateCallback("f".into(), "_add"))
        );

        syms.udftype = Item_udftype::UDFTYPE_AGGREGATE;
        assert_eq!(
            syms.validate(),
            Err(SymbolError::MissingAggregateCallback("f".into(), "_clear"))
        );
        syms.clear = Some(t_clear);
        assert_eq!(syms.validate(), Ok(()));
    }

    #[test]
    fn resolve_from_lookup() {
        use Item_udftype::{UDFTYPE_AGGREGATE, UDFTYPE_FUNCTION};

        let mut table: HashMap<&str, Udf_func_any> = HashMap::new();
        table.insert("agg", UdfCallback::Double(t_double).erase());
        table.insert("agg_init", UdfCallback::Init(t_init).erase());
        table.insert("agg_deinit", UdfCallback::Deinit(t_deinit).erase());
        table.insert("agg_clear", UdfCallback::Clear(t_clear).erase());
        table.insert("agg_add", UdfCallback::Add(t_add).erase());

        let lookup = |s: &str| table.get(s).copied().flatten();
        let syms = unsafe {
            UdfSymbols::resolve("agg", UDFTYPE_AGGREGATE, Item_result::REAL_RESULT, lookup)
        }
        .unwrap();
        assert!(syms.init.is_some());
        assert!(syms.remove.is_none());
        assert_eq!(syms.process.map(|p| p.kind()), Some(CallbackKind::Double));

        let err = unsafe {
            UdfSymbols::resolve("agg", UDFTYPE_AGGREGATE, Item_result::ROW_RESULT, lookup)
        };
        assert!(matches!(err, Err(SymbolError::InvalidReturnType(_))));

        let missing = unsafe {
            UdfSymbols::resolve("nope", UDFTYPE_FUNCTION, Item_result::INT_RESULT, lookup)
        };
        assert_eq!(missing.err(), Some(SymbolError::MissingProcess("nope".into())));
    }
}
