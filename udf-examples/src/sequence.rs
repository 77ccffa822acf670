//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `udf_sequence`: 1, 2, 3, ... one per row, optionally offset by the argument
//!
//! ```sql
//! SELECT some_col, udf_sequence() FROM some_table;
//! SELECT some_col, udf_sequence(8) FROM some_table;
//! ```
use udf::prelude::*;

struct UdfSequence {
    last: i64,
}

#[register]
impl BasicUdf for UdfSequence {
    type Returns<'a> = i64;

    fn init(cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.len() > 1 {
            return Err(format!("udf_sequence takes 0 or 1 arguments, got {}", args.len()));
        }
        if let Some(mut offset) = args.get(0) {
            offset.set_type_coercion(SqlType::Int);
        }

        // every row differs
        cfg.set_is_const(false);
        Ok(Self { last: 0 })
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        let offset = args.get(0).and_then(|a| a.value().as_int()).unwrap_or(0);
        self.last += 1;
        Ok(self.last + offset)
    }
}

#[cfg(test)]
mod tests {
    use udf::mock::*;

    use super::*;

    #[test]
    fn counts_rows() {
        let mut cfg = MockUdfCfg::new();
        let mut args = mock_args![];
        let mut seq = UdfSequence::init(cfg.as_init(), &args.as_init()).unwrap();

        let got: Vec<_> = (0..4)
            .map(|_| seq.process(cfg.as_process(), &args.as_process(), None).unwrap())
            .collect();
        assert_eq!(got, [1, 2, 3, 4]);
    }

    #[test]
    fn offset_applies_to_every_row() {
        let mut cfg = MockUdfCfg::new();
        let mut args = mock_args![(Int 8, "8", false)];
        let mut seq = UdfSequence::init(cfg.as_init(), &args.as_init()).unwrap();
        assert_eq!(seq.process(cfg.as_process(), &args.as_process(), None), Ok(9));
        assert_eq!(seq.process(cfg.as_process(), &args.as_process(), None), Ok(10));
    }

    #[test]
    fn too_many_arguments() {
        let mut cfg = MockUdfCfg::new();
        let mut args = mock_args![(Int 1, "a", false), (Int 2, "b", false)];
        let err = UdfSequence::init(cfg.as_init(), &args.as_init()).err();
        assert_eq!(err.as_deref(), Some("udf_sequence takes 0 or 1 arguments, got 2"));
    }
}
