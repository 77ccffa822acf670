//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `udf_median`: median of a group, reals are truncated to integers
//!
//! ```sql
//! SELECT udf_median(value) FROM measurements GROUP BY sensor;
//! ```
use udf::prelude::*;

#[derive(Debug, Default)]
struct UdfMedian {
    values: Vec<i64>,
}

#[register]
impl BasicUdf for UdfMedian {
    type Returns<'a> = Option<i64>;

    fn init(_cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 1 {
            return Err(format!("udf_median takes 1 argument, got {}", args.len()));
        }
        Ok(Self::default())
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        self.values.sort_unstable();
        Ok(self.values.get(self.values.len() / 2).copied())
    }
}

#[register]
impl AggregateUdf for UdfMedian {
    fn clear(
        &mut self,
        _cfg: &UdfCfg<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        self.values.clear();
        Ok(())
    }

    fn add(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        let Some(arg) = args.get(0) else {
            return Ok(());
        };
        let value = arg.value();
        if let Some(v) = value.as_int() {
            self.values.push(v);
        } else if let Some(v) = value.as_real() {
            self.values.push(v as i64);
        }
        Ok(())
    }
}
