//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `sum_int`: add up any number of arguments as integers
//!
//! ```sql
//! SELECT sum_int(1, 2, 3, 4, '5', 6.2);  -- 21
//! ```
use udf::prelude::*;

#[derive(Debug, PartialEq, Eq, Default)]
struct SumInt;

#[register]
impl BasicUdf for SumInt {
    type Returns<'a> = i64;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        // the server refuses the query if a value can't be converted
        for mut arg in args {
            arg.set_type_coercion(SqlType::Int);
        }
        cfg.set_is_const(true);
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(args.iter().filter_map(|arg| arg.value().as_int()).sum())
    }
}
