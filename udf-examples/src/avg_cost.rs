//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `avg_cost`: average cost of a position built from buys and sells
//!
//! Takes a quantity (negative for sells) and a unit price. Selling keeps the average cost;
//! crossing from long to short (or back) restarts it at the crossing price.
//!
//! ```sql
//! SELECT avg_cost(qty, price) FROM trades GROUP BY symbol;
//! ```
use udf::prelude::*;

#[derive(Debug, Default, PartialEq)]
struct AvgCost {
    total_qty: i64,
    total_price: f64,
}

#[register]
impl BasicUdf for AvgCost {
    type Returns<'a> = Option<f64>;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 2 {
            return Err(format!("expected two arguments; got {}", args.len()));
        }
        let mut args = args.iter();
        if let (Some(mut qty), Some(mut price)) = (args.next(), args.next()) {
            qty.set_type_coercion(SqlType::Int);
            price.set_type_coercion(SqlType::Real);
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
        if self.total_qty == 0 {
            return Ok(None);
        }
        Ok(Some(self.total_price / self.total_qty as f64))
    }
}

#[register]
impl AggregateUdf for AvgCost {
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
        let qty = args.get(0).and_then(|a| a.value().as_int());
        let price = args.get(1).and_then(|a| a.value().as_real());
        let (Some(qty), Some(mut price)) = (qty, price) else {
            return Ok(());
        };

        let opposite = (self.total_qty >= 0 && qty < 0) || (self.total_qty < 0 && qty > 0);
        if opposite {
            let new_qty = self.total_qty + qty;
            if !((qty < 0 && new_qty < 0) || (qty > 0 && new_qty > 0)) {
                // reducing the position keeps the current average
                price = self.total_price / self.total_qty as f64;
            }
            self.total_qty = new_qty;
            self.total_price = price * new_qty as f64;
        } else {
            self.total_qty += qty;
            self.total_price += price * qty as f64;
        }

        if self.total_qty == 0 {
            self.total_price = 0.0;
        }
        Ok(())
    }
}
