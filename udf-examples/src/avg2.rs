//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `avg2`: weighted average over a group, usable as a window function on MariaDB
//!
//! Takes a quantity and a value; the result is the sum of values over the sum of quantities.
//!
//! ```sql
//! SELECT avg2(qty, price) FROM orders GROUP BY customer;
//! SELECT avg2(qty, price) OVER (ORDER BY ts ROWS BETWEEN 2 PRECEDING AND CURRENT ROW) FROM orders;
//! ```
use udf::prelude::*;

#[derive(Debug, Default, PartialEq)]
struct Avg2 {
    count: i64,
    sum: f64,
}

impl Avg2 {
    /// Quantity and value of a row, `None` if either is `NULL`
    fn row(args: &ArgList<Process>) -> Option<(i64, f64)> {
        let qty = args.get(0)?.value().as_int()?;
        let value = args.get(1)?.value().as_real()?;
        Some((qty, value))
    }
}

#[register(name = "avg2")]
impl BasicUdf for Avg2 {
    type Returns<'a> = Option<f64>;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 2 {
            return Err(format!("avg2 takes 2 arguments, got {}", args.len()));
        }
        let mut args = args.iter();
        if let (Some(mut qty), Some(mut value)) = (args.next(), args.next()) {
            qty.set_type_coercion(SqlType::Int);
            value.set_type_coercion(SqlType::Real);
        }

        cfg.set_decimals(10);
        cfg.set_max_len(20);
        Ok(Self::default())
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        if self.count == 0 {
            return Ok(None);
        }
        Ok(Some(self.sum / self.count as f64))
    }
}

#[register(name = "avg2")]
impl AggregateUdf for Avg2 {
    fn clear(
        &mut self,
        _cfg: &UdfCfg<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        *self = Self::default();
        Ok(())
    }

    fn add(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        if let Some((qty, value)) = Self::row(args) {
            self.count += qty;
            self.sum += value;
        }
        Ok(())
    }

    fn remove(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        if let Some((qty, value)) = Self::row(args) {
            self.count -= qty;
            self.sum -= value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use udf::mock::*;
    use udf::udf_sys::Item_result;
    use udf_tests::{symbols, Output, UdfHarness};

    use super::*;

    #[test]
    fn init_checks_arg_count() {
        let mut cfg = MockUdfCfg::new();
        let mut args = mock_args![(Int None, "qty", false)];
        let err = Avg2::init(cfg.as_init(), &args.as_init()).unwrap_err();
        assert_eq!(err, "avg2 takes 2 arguments, got 1");
    }

    #[test]
    fn add_and_remove() {
        let mut cfg = MockUdfCfg::new();
        let mut avg = Avg2::default();

        for (qty, value) in [(1, 10.0), (2, 20.0), (1, 30.0)] {
            let mut args = mock_args![(Int qty, "qty", false), (Real value, "price", false)];
            avg.add(cfg.as_process(), &args.as_process(), None).unwrap();
        }
        assert_eq!(avg.process(cfg.as_process(), &mock_args![].as_process(), None), Ok(Some(15.0)));

        let mut args = mock_args![(Int 2, "qty", false), (Real 20.0, "price", false)];
        avg.remove(cfg.as_process(), &args.as_process(), None).unwrap();
        assert_eq!(avg, Avg2 { count: 2, sum: 40.0 });

        let mut args = mock_args![(Int None, "qty", true), (Real 5.0, "price", false)];
        avg.add(cfg.as_process(), &args.as_process(), None).unwrap();
        assert_eq!(avg, Avg2 { count: 2, sum: 40.0 });
    }

    #[test]
    fn window_through_the_server_calls() -> eyre::Result<()> {
        let table = symbols![avg2, avg2_init, avg2_deinit, avg2_clear, avg2_add, avg2_remove];
        let mut h = UdfHarness::aggregate("avg2", Item_result::REAL_RESULT, &table)?;
        h.init(mock_args![(Int None, "qty", true), (Real None, "price", true)])?;
        assert!(*h.cfg().maybe_null());
        assert_eq!(*h.cfg().decimals(), 10);

        let row = |q: i64, v: f64| vec![MockArgData::Int(Some(q)), MockArgData::Real(Some(v))];
        assert_eq!(h.group(Vec::new())?, Output::Null);

        h.begin_group()?;
        h.add(row(1, 4.0))?;
        h.add(row(3, 8.0))?;
        assert_eq!(h.finish_group()?, Output::Real(3.0));
        h.remove(row(1, 4.0))?;
        assert_eq!(h.finish_group()?, Output::Real(8.0 / 3.0));
        Ok(())
    }
}
