//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `udf_attribute`: the attributes of its arguments, which is how they were written in the
//! query (or their alias)
//!
//! ```sql
//! SELECT udf_attribute(1 + 2, some_col, 'x' AS named);  -- '1 + 2, some_col, named'
//! ```
use udf::prelude::*;

#[derive(Debug, PartialEq, Eq, Default)]
struct UdfAttribute;

#[register]
impl BasicUdf for UdfAttribute {
    type Returns<'a> = String;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        let attributes: Vec<&str> = args.iter().map(|arg| arg.attribute()).collect();
        Ok(attributes.join(", "))
    }
}
