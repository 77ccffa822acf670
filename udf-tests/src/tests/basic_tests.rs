//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use std::sync::atomic::{AtomicUsize, Ordering};

use udf::mock::{MockArgData, MockArgList};
use udf::prelude::*;
use udf::{mock_args, RegisteredBasicUdf};
use udf_sys::Item_result;

use super::{int, real, string};
use crate::{symbols, HarnessError, Output, UdfHarness};

/// Sums its arguments as integers
pub struct AddAll;

#[register]
impl BasicUdf for AddAll {
    type Returns<'a> = i64;

    fn init(_cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.is_empty() {
            return Err("add_all takes at least one argument".to_owned());
        }
        for mut arg in args {
            arg.set_type_coercion(SqlType::Int);
        }
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(args.iter().filter_map(|a| a.value().as_int()).sum())
    }
}

/// Length of the hypotenuse, `NULL` if either side is
struct Hypotenuse;

#[register]
impl BasicUdf for Hypotenuse {
    type Returns<'a> = Option<f64>;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 2 {
            return Err(format!("hypotenuse takes 2 arguments, got {}", args.len()));
        }
        for mut arg in args {
            arg.set_type_coercion(SqlType::Real);
        }
        cfg.set_decimals(4);
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        let a = args.get(0).and_then(|a| a.value().as_real());
        let b = args.get(1).and_then(|a| a.value().as_real());
        Ok(a.zip(b).map(|(a, b)| a.hypot(b)))
    }
}

/// Whether the first argument was a constant at prepare time
struct ArgIsConst(bool);

#[register]
impl BasicUdf for ArgIsConst {
    type Returns<'a> = i64;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        let is_const = args.get(0).is_some_and(|a| a.is_const());
        cfg.set_is_const(is_const);
        Ok(Self(is_const))
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(i64::from(self.0))
    }
}

static TRACKED_DROPS: AtomicUsize = AtomicUsize::new(0);

/// Counts rows, and its own drops
struct Tracked(i64);

impl Drop for Tracked {
    fn drop(&mut self) {
        TRACKED_DROPS.fetch_add(1, Ordering::SeqCst);
    }
}

#[register]
impl BasicUdf for Tracked {
    type Returns<'a> = i64;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self(0))
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        self.0 += 1;
        Ok(self.0)
    }
}

pub(super) fn add_all_harness() -> UdfHarness {
    let table = symbols![add_all, add_all_init, add_all_deinit];
    UdfHarness::function("add_all", Item_result::INT_RESULT, &table).unwrap()
}

#[test]
fn integer_function_sums_rows() -> eyre::Result<()> {
    let mut h = add_all_harness();
    h.init(mock_args![(Int None, "a", false), (Int None, "b", true)])?;
    h.expect_rows(
        vec![vec![int(1), int(2)], vec![int(10), int(-4)], vec![int(5), MockArgData::Int(None)]],
        &[Output::Int(3), Output::Int(6), Output::Int(5)],
    )?;
    h.deinit()
}

#[test]
fn coercions_apply_to_every_row() -> eyre::Result<()> {
    let mut h = add_all_harness();
    h.init(mock_args![(String None, "a", false), (Real None, "b", false)])?;
    assert_eq!(h.arg_types(), [SqlType::Int, SqlType::Int]);
    h.expect_rows(vec![vec![string("12"), real(2.6)]], &[Output::Int(15)])
}

#[test]
fn init_errors_reach_the_caller() {
    let mut h = add_all_harness();
    let err = h.init(MockArgList::new(Vec::new())).unwrap_err();
    assert!(err.to_string().contains("add_all takes at least one argument"));
    assert!(!h.has_state());

    let err = h.process(Vec::new()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<HarnessError>(),
        Some(&HarnessError::NotInitialized("add_all".to_owned()))
    );
}

#[test]
fn real_function_with_nulls() -> eyre::Result<()> {
    let table = symbols![hypotenuse, hypotenuse_init, hypotenuse_deinit];
    let mut h = UdfHarness::function("hypotenuse", Item_result::REAL_RESULT, &table)?;
    h.init(mock_args![(Int None, "a", true), (Int None, "b", true)])?;
    assert!(*h.cfg().maybe_null());
    assert_eq!(*h.cfg().decimals(), 4);

    h.expect_rows(
        vec![
            vec![int(3), int(4)],
            vec![real(5.0), real(12.0)],
            vec![MockArgData::Int(None), int(1)],
        ],
        &[Output::Real(5.0), Output::Real(13.0), Output::Null],
    )
}

#[test]
fn wrong_arg_count_fails_init() {
    let table = symbols![hypotenuse, hypotenuse_init, hypotenuse_deinit];
    let mut h = UdfHarness::function("hypotenuse", Item_result::REAL_RESULT, &table).unwrap();
    let err = h.init(mock_args![(Int 1, "a", false)]).unwrap_err();
    assert!(err.to_string().contains("hypotenuse takes 2 arguments, got 1"));
}

#[test]
fn constness_is_seen_in_init() -> eyre::Result<()> {
    let table = symbols![arg_is_const, arg_is_const_init, arg_is_const_deinit];

    let mut h = UdfHarness::function("arg_is_const", Item_result::INT_RESULT, &table)?;
    h.init(mock_args![(Int 5, "5", false)])?;
    assert!(*h.cfg().is_const());
    assert_eq!(h.process(vec![int(5)])?, Output::Int(1));
    h.deinit()?;

    let mut h = UdfHarness::function("arg_is_const", Item_result::INT_RESULT, &table)?;
    h.init(mock_args![(Int None, "col", false)])?;
    assert!(!*h.cfg().is_const());
    assert_eq!(h.process(vec![int(5)])?, Output::Int(0));
    Ok(())
}

#[test]
fn state_lives_from_init_to_deinit() -> eyre::Result<()> {
    let table = symbols![tracked, tracked_init, tracked_deinit];
    let mut h = UdfHarness::function("tracked", Item_result::INT_RESULT, &table)?;
    let before = TRACKED_DROPS.load(Ordering::SeqCst);

    h.init(MockArgList::new(Vec::new()))?;
    assert!(h.has_state());
    assert_eq!(h.process(Vec::new())?, Output::Int(1));
    assert_eq!(h.process(Vec::new())?, Output::Int(2));
    assert_eq!(TRACKED_DROPS.load(Ordering::SeqCst), before);

    h.deinit()?;
    assert!(!h.has_state());
    assert_eq!(TRACKED_DROPS.load(Ordering::SeqCst), before + 1);

    // a second deinit from the server finds nothing to drop
    unsafe { tracked_deinit(h.cfg().as_raw_ptr()) };
    assert_eq!(TRACKED_DROPS.load(Ordering::SeqCst), before + 1);

    // dropping an initialized harness deinits it
    {
        let mut h = UdfHarness::function("tracked", Item_result::INT_RESULT, &table)?;
        h.init(MockArgList::new(Vec::new()))?;
    }
    assert_eq!(TRACKED_DROPS.load(Ordering::SeqCst), before + 2);
    Ok(())
}

#[test]
fn registration_constants() {
    assert_eq!(<AddAll as RegisteredBasicUdf>::NAME, "add_all");
    assert!(<AddAll as RegisteredBasicUdf>::ALIASES.is_empty());
    assert!(<AddAll as RegisteredBasicUdf>::DEFAULT_NAME_USED);
    assert_eq!(<ArgIsConst as RegisteredBasicUdf>::NAME, "arg_is_const");
}
