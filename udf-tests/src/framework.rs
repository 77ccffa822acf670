//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! An in-process stand-in for the server side of the UDF calling convention
//!
//! [`UdfHarness`] resolves a function's symbols the way the server does after
//! `CREATE FUNCTION ... SONAME`, then drives them in the server's order:
//!
//! - `xxx_init` once, with the arguments as seen at prepare time
//! - per row, `xxx`; or per group, `xxx_clear`, `xxx_add` for every row, then `xxx`
//! - `xxx_deinit` once, also on drop
//!
//! Argument memory is owned by [`udf::mock`] types, so the callbacks read and write real
//! `UDF_INIT` and `UDF_ARGS` structs. Coercions requested in `init` are applied to every row
//! afterwards, as the server would.
use std::collections::HashMap;
use std::ffi::{c_char, c_uchar, c_ulong, CStr};
use std::{fmt, mem, slice};

use eyre::{eyre, WrapErr};
use owo_colors::OwoColorize;
use udf::mock::{MockArgData, MockArgList, MockUdfCfg};
use udf::SqlType;
use udf_sys::{
    Item_result, Item_udftype, ProcessCallback, UdfAnyFn, UdfSymbols, Udf_func_any,
    MYSQL_ERRMSG_SIZE, MYSQL_RESULT_BUFFER_SIZE,
};

/// Exported functions by name, standing in for `dlsym`
///
/// Usually built with [`symbols!`](crate::symbols).
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, UdfAnyFn>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function's address under `name`
    ///
    /// # Safety
    ///
    /// `addr` must be the address of an `extern "C"` function.
    pub unsafe fn insert(&mut self, name: &str, addr: *const ()) {
        // SAFETY: the caller promises this is a function
        let f = unsafe { mem::transmute::<*const (), UdfAnyFn>(addr) };
        self.symbols.insert(name.to_owned(), f);
    }

    pub fn get(&self, name: &str) -> Udf_func_any {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }
}

/// Build a [`SymbolTable`] from functions in scope, keyed by their names
///
/// ```ignore
/// let table = symbols![sum_int, sum_int_init, sum_int_deinit];
/// ```
#[macro_export]
macro_rules! symbols {
    ($($sym:ident),* $(,)?) => {{
        let mut table = $crate::SymbolTable::new();
        $(
            // SAFETY: every entry is a function item
            unsafe { table.insert(stringify!($sym), $sym as *const ()) };
        )*
        table
    }};
}

/// What one call of the process function produced
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Int(i64),
    Real(f64),
    Bytes(Vec<u8>),
    /// `is_null` was set
    Null,
    /// `error` was set
    Error,
}

impl Output {
    pub fn string(s: &str) -> Self {
        Self::Bytes(s.as_bytes().to_vec())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl From<i64> for Output {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Output {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "'{}'", String::from_utf8_lossy(v)),
            Self::Null => f.write_str("NULL"),
            Self::Error => f.write_str("<error>"),
        }
    }
}

/// Misuse of the harness itself, as opposed to a function misbehaving
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    #[error("`{0}` has not been initialized")]
    NotInitialized(String),
    #[error("`{0}` is already initialized")]
    AlreadyInitialized(String),
    #[error("`{name}` was initialized with {expected} arguments, but the row has {got}")]
    ArgCount { name: String, expected: usize, got: usize },
    #[error("`{0}` is not an aggregate function")]
    NotAggregate(String),
    #[error("`{0}` does not export a remove function")]
    NoRemove(String),
}

/// One function, driven through its exported symbols
#[derive(Debug)]
pub struct UdfHarness {
    symbols: UdfSymbols,
    process: ProcessCallback,
    cfg: MockUdfCfg,
    args: MockArgList,
    coercions: Vec<SqlType>,
    result: Vec<c_char>,
    initialized: bool,
    /// `is_null` and `error` of the running group
    group_flags: (c_uchar, c_uchar),
}

impl UdfHarness {
    /// Resolve `name` from `table` as `CREATE [AGGREGATE] FUNCTION name RETURNS ...` would
    pub fn new(
        name: &str,
        udftype: Item_udftype,
        returns: Item_result,
        table: &SymbolTable,
    ) -> eyre::Result<Self> {
        // SAFETY: the table's entries are exports of `#[register]`, whose signatures follow
        // their suffixes
        let symbols = unsafe { UdfSymbols::resolve(name, udftype, returns, |s| table.get(s)) }
            .wrap_err_with(|| format!("unable to resolve `{name}`"))?;
        let process = symbols.process.ok_or_else(|| eyre!("`{name}` has no process function"))?;

        Ok(Self {
            symbols,
            process,
            cfg: MockUdfCfg::new(),
            args: MockArgList::new(Vec::new()),
            coercions: Vec::new(),
            result: vec![0; MYSQL_RESULT_BUFFER_SIZE],
            initialized: false,
            group_flags: (0, 0),
        })
    }

    /// `CREATE FUNCTION name RETURNS ...`
    pub fn function(name: &str, returns: Item_result, table: &SymbolTable) -> eyre::Result<Self> {
        Self::new(name, Item_udftype::UDFTYPE_FUNCTION, returns, table)
    }

    /// `CREATE AGGREGATE FUNCTION name RETURNS ...`
    pub fn aggregate(name: &str, returns: Item_result, table: &SymbolTable) -> eyre::Result<Self> {
        Self::new(name, Item_udftype::UDFTYPE_AGGREGATE, returns, table)
    }

    pub fn name(&self) -> &str {
        &self.symbols.name
    }

    pub fn symbols(&self) -> &UdfSymbols {
        &self.symbols
    }

    /// The function's `UDF_INIT`, to inspect what `init` configured
    pub fn cfg(&mut self) -> &mut MockUdfCfg {
        &mut self.cfg
    }

    /// Argument types after `init`'s coercions
    pub fn arg_types(&self) -> &[SqlType] {
        &self.coercions
    }

    /// Whether the function's state is currently allocated
    pub fn has_state(&self) -> bool {
        !self.cfg.state_ptr().is_null()
    }

    /// Call `xxx_init` with the prepare-time arguments
    ///
    /// Constant arguments carry their value, the rest should be `None`.
    pub fn init(&mut self, args: impl Into<MockArgList>) -> eyre::Result<()> {
        if self.initialized {
            return Err(HarnessError::AlreadyInitialized(self.symbols.name.clone()).into());
        }

        self.args = args.into();
        let mut message = [0 as c_char; MYSQL_ERRMSG_SIZE];

        if let Some(init) = self.symbols.init {
            // SAFETY: both structs are owned by `self`, the buffer has the size the ABI promises
            let failed = unsafe {
                init(self.cfg.as_raw_ptr(), self.args.as_raw_ptr(), message.as_mut_ptr())
            };
            if failed {
                let message = read_message(&message);
                return Err(eyre!(
                    "{} {}",
                    format!("{}_init failed:", self.symbols.name).bold().red(),
                    message.bold().white()
                ));
            }
        }

        self.initialized = true;
        self.coercions = self.args.arg_types();
        for (index, ty) in self.coercions.iter().enumerate() {
            if let Some(arg) = self.args.arg_mut(index) {
                arg.value = coerce(&arg.value, *ty);
            }
        }

        Ok(())
    }

    /// Call `xxx` for one row
    pub fn process(&mut self, row: Vec<MockArgData>) -> eyre::Result<Output> {
        self.set_row(row)?;
        Ok(self.call_process(0))
    }

    /// Call `xxx_clear`, `xxx_add` for every row, then `xxx`
    pub fn group(&mut self, rows: Vec<Vec<MockArgData>>) -> eyre::Result<Output> {
        self.begin_group()?;
        for row in rows {
            self.add(row)?;
        }
        self.finish_group()
    }

    /// Start a group with `xxx_clear`
    pub fn begin_group(&mut self) -> eyre::Result<()> {
        self.ensure_initialized()?;
        let clear = self
            .symbols
            .clear
            .ok_or_else(|| HarnessError::NotAggregate(self.symbols.name.clone()))?;

        self.group_flags = (0, 0);
        let (is_null, error) = &mut self.group_flags;
        // SAFETY: `cfg` was initialized
        unsafe { clear(self.cfg.as_raw_ptr(), is_null, error) };
        Ok(())
    }

    /// Fold one row into the running group with `xxx_add`, returning the error flag
    pub fn add(&mut self, row: Vec<MockArgData>) -> eyre::Result<u8> {
        let add = self
            .symbols
            .add
            .ok_or_else(|| HarnessError::NotAggregate(self.symbols.name.clone()))?;
        self.set_row(row)?;
        self.call_step(add);
        Ok(self.group_flags.1)
    }

    /// Take one row out of the running group with `xxx_remove`, returning the error flag
    pub fn remove(&mut self, row: Vec<MockArgData>) -> eyre::Result<u8> {
        let remove = self
            .symbols
            .remove
            .ok_or_else(|| HarnessError::NoRemove(self.symbols.name.clone()))?;
        self.set_row(row)?;
        self.call_step(remove);
        Ok(self.group_flags.1)
    }

    /// Produce the group's result with `xxx`
    pub fn finish_group(&mut self) -> eyre::Result<Output> {
        self.ensure_initialized()?;
        let error = self.group_flags.1;
        Ok(self.call_process(error))
    }

    /// Call `xxx_deinit`
    pub fn deinit(&mut self) -> eyre::Result<()> {
        self.ensure_initialized()?;
        self.initialized = false;
        if let Some(deinit) = self.symbols.deinit {
            // SAFETY: `cfg` was initialized and is not used by the function after this
            unsafe { deinit(self.cfg.as_raw_ptr()) };
        }
        Ok(())
    }

    /// `init`, `xxx` for each row, `deinit`
    pub fn run(
        &mut self,
        args: impl Into<MockArgList>,
        rows: Vec<Vec<MockArgData>>,
    ) -> eyre::Result<Vec<Output>> {
        self.init(args)?;
        let outputs = rows.into_iter().map(|row| self.process(row)).collect::<eyre::Result<_>>();
        self.deinit()?;
        outputs
    }

    /// Run rows through an initialized function and compare every result
    pub fn expect_rows(
        &mut self,
        rows: Vec<Vec<MockArgData>>,
        expected: &[Output],
    ) -> eyre::Result<()> {
        if rows.len() != expected.len() {
            return Err(eyre!("{} rows but {} expected results", rows.len(), expected.len()));
        }

        let mut failures = Vec::new();
        for (index, (row, want)) in rows.into_iter().zip(expected).enumerate() {
            let got = self.process(row).wrap_err_with(|| format!("row {index}"))?;
            if !outputs_match(&got, want) {
                failures.push(format!(
                    "row {index}: expected {}, got {}",
                    want.to_string().green(),
                    got.to_string().bold().red()
                ));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            let name = &self.symbols.name;
            Err(eyre!("`{name}` returned unexpected results\n{}", failures.join("\n")))
        }
    }

    fn ensure_initialized(&self) -> Result<(), HarnessError> {
        if self.initialized {
            Ok(())
        } else {
            Err(HarnessError::NotInitialized(self.symbols.name.clone()))
        }
    }

    fn set_row(&mut self, row: Vec<MockArgData>) -> eyre::Result<()> {
        self.ensure_initialized()?;
        if row.len() != self.coercions.len() {
            return Err(HarnessError::ArgCount {
                name: self.symbols.name.clone(),
                expected: self.coercions.len(),
                got: row.len(),
            }
            .into());
        }

        for (index, (value, ty)) in row.into_iter().zip(&self.coercions).enumerate() {
            if let Some(arg) = self.args.arg_mut(index) {
                arg.value = coerce(&value, *ty);
            }
        }
        Ok(())
    }

    fn call_step(&mut self, step: udf_sys::UdfAddFn) {
        let (is_null, error) = &mut self.group_flags;
        // SAFETY: `cfg` was initialized, `args` owns its arrays
        unsafe { step(self.cfg.as_raw_ptr(), self.args.as_raw_ptr(), is_null, error) };
    }

    fn call_process(&mut self, mut error: c_uchar) -> Output {
        let mut is_null: c_uchar = 0;
        let initid = self.cfg.as_raw_ptr();
        let args = self.args.as_raw_ptr();

        // SAFETY: `cfg` was initialized, `args` owns its arrays, `result` has the capacity
        // passed in `length`
        let value = unsafe {
            match self.process {
                ProcessCallback::LongLong(f) => {
                    Output::Int(f(initid, args, &mut is_null, &mut error))
                }
                ProcessCallback::Double(f) => {
                    Output::Real(f(initid, args, &mut is_null, &mut error))
                }
                ProcessCallback::String(f) => {
                    let mut length = self.result.len() as c_ulong;
                    let ptr = f(
                        initid,
                        args,
                        self.result.as_mut_ptr(),
                        &mut length,
                        &mut is_null,
                        &mut error,
                    );
                    if ptr.is_null() {
                        Output::Null
                    } else {
                        let bytes = slice::from_raw_parts(ptr.cast::<u8>(), length as usize);
                        Output::Bytes(bytes.to_vec())
                    }
                }
            }
        };

        if error != 0 {
            Output::Error
        } else if is_null != 0 {
            Output::Null
        } else {
            value
        }
    }
}

impl Drop for UdfHarness {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.deinit();
        }
    }
}

fn read_message(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf.iter().map(|&c| c as u8).collect();
    match CStr::from_bytes_until_nul(&bytes) {
        Ok(msg) => msg.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Reals compare with a tolerance
fn outputs_match(got: &Output, want: &Output) -> bool {
    match (got, want) {
        (Output::Real(a), Output::Real(b)) => (a - b).abs() <= f64::EPSILON * a.abs().max(1.0),
        _ => got == want,
    }
}

/// Convert a value to the type `init` asked for, roughly the way the server casts
pub fn coerce(value: &MockArgData, to: SqlType) -> MockArgData {
    use MockArgData as D;

    match (value, to) {
        (D::Int(v), SqlType::Real) => D::Real(v.map(|i| i as f64)),
        (D::Int(v), SqlType::String) => D::String(v.map(|i| i.to_string())),
        (D::Int(v), SqlType::Decimal) => D::Decimal(v.map(|i| i.to_string())),
        (D::Real(v), SqlType::Int) => D::Int(v.map(|r| r.round() as i64)),
        (D::Real(v), SqlType::String) => D::String(v.map(|r| r.to_string())),
        (D::Real(v), SqlType::Decimal) => D::Decimal(v.map(|r| r.to_string())),
        (D::String(v) | D::Decimal(v), SqlType::Int) => D::Int(v.as_deref().map(parse_int)),
        (D::String(v) | D::Decimal(v), SqlType::Real) => D::Real(v.as_deref().map(parse_real)),
        (D::String(v), SqlType::Decimal) => D::Decimal(v.clone()),
        (D::Decimal(v), SqlType::String) => D::String(v.clone()),
        (D::Bytes(v), SqlType::Int | SqlType::Real | SqlType::Decimal) => {
            let text = v.as_deref().map(|b| String::from_utf8_lossy(b).into_owned());
            coerce(&D::String(text), to)
        }
        _ => value.clone(),
    }
}

/// Leading integer of a string, `0` if there is none
fn parse_int(s: &str) -> i64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().unwrap_or(0)
}

fn parse_real(s: &str) -> f64 {
    s.trim().parse().unwrap_or(0.0)
}
