//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `mishmash`: the bytes of all its arguments, concatenated
//!
//! Numbers are written in native byte order. `NULL`s are skipped, and nothing at all gives
//! `NULL`.
//!
//! ```sql
//! SELECT mishmash('abc', 1, 2.5);
//! ```
use udf::prelude::*;

#[derive(Debug, Default)]
pub struct Mishmash(Vec<u8>);

#[register]
impl BasicUdf for Mishmash {
    type Returns<'a> = Option<&'a [u8]>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self::default())
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        self.0.clear();
        for arg in args {
            match arg.value() {
                SqlResult::String(Some(v)) => self.0.extend_from_slice(v),
                SqlResult::Real(Some(v)) => self.0.extend_from_slice(&v.to_ne_bytes()),
                SqlResult::Int(Some(v)) => self.0.extend_from_slice(&v.to_ne_bytes()),
                SqlResult::Decimal(Some(v)) => self.0.extend_from_slice(v.as_bytes()),
                _ => (),
            }
        }

        if self.0.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.0.as_slice()))
        }
    }
}

#[cfg(test)]
mod tests {
    use udf::mock::*;
    use udf::udf_sys::Item_result;
    use udf_tests::{symbols, Output, UdfHarness};

    use super::*;

    #[test]
    fn concatenates_bytes() {
        let mut cfg = MockUdfCfg::new();
        let mut args = mock_args![
            ("ab", "s", false),
            (Int 1, "i", false),
            (Decimal "1.5", "d", false),
            (Real None, "r", true),
        ];
        let mut m = Mishmash::default();

        let mut expected = b"ab".to_vec();
        expected.extend_from_slice(&1i64.to_ne_bytes());
        expected.extend_from_slice(b"1.5");

        let res = m.process(cfg.as_process(), &args.as_process(), None).unwrap();
        assert_eq!(res, Some(expected.as_slice()));
    }

    #[test]
    fn rows_do_not_accumulate() -> eyre::Result<()> {
        let table = symbols![mishmash, mishmash_init, mishmash_deinit];
        let mut h = UdfHarness::function("mishmash", Item_result::STRING_RESULT, &table)?;
        h.init(mock_args![(String None, "a", true), (String None, "b", true)])?;
        h.expect_rows(
            vec![
                vec!["ab".into(), "cd".into()],
                vec!["x".into(), MockArgData::String(None)],
                vec![MockArgData::String(None), MockArgData::String(None)],
            ],
            &[Output::string("abcd"), Output::string("x"), Output::Null],
        )
    }
}
