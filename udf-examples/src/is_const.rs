//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `is_const`: whether the argument is a constant in the query
//!
//! ```sql
//! SELECT is_const(1);      -- 'const'
//! SELECT is_const(col) ... -- 'not const'
//! ```
use udf::prelude::*;

struct IsConst {
    is_const: bool,
}

#[register]
impl BasicUdf for IsConst {
    type Returns<'a> = &'static str;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() != 1 {
            return Err("is_const takes a single argument".to_owned());
        }
        let is_const = args.get(0).is_some_and(|a| a.is_const());
        cfg.set_is_const(is_const);
        Ok(Self { is_const })
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(if self.is_const { "const" } else { "not const" })
    }
}
