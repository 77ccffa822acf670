//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `log_calls`: writes a line to the server's log for every callback, returns `NULL`
//!
//! ```sql
//! SELECT log_calls(col) FROM t GROUP BY other;
//! ```
use udf::prelude::*;

struct LogCalls;

#[register]
impl BasicUdf for LogCalls {
    type Returns<'a> = Option<i64>;

    fn init(_cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        udf_log!(Note: "called init with {} arguments", args.len());
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        udf_log!(Note: "called process, error {error:?}");
        Ok(None)
    }
}

#[register]
impl AggregateUdf for LogCalls {
    fn clear(
        &mut self,
        _cfg: &UdfCfg<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        udf_log!(Note: "called clear");
        Ok(())
    }

    fn add(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        udf_log!(Note: "called add with {args:?}");
        Ok(())
    }

    fn remove(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        udf_log!(Note: "called remove with {args:?}");
        Ok(())
    }
}

impl Drop for LogCalls {
    fn drop(&mut self) {
        udf_log!(Note: "called deinit");
    }
}

#[cfg(test)]
mod tests {
    use udf::mock::*;
    use udf::udf_sys::Item_result;
    use udf_tests::{symbols, Output, UdfHarness};

    use super::*;

    #[test]
    fn every_callback_runs() -> eyre::Result<()> {
        let table = symbols![
            log_calls,
            log_calls_init,
            log_calls_deinit,
            log_calls_clear,
            log_calls_add,
            log_calls_remove,
        ];
        let mut h = UdfHarness::aggregate("log_calls", Item_result::INT_RESULT, &table)?;
        h.init(mock_args![(Int None, "col", true)])?;

        h.begin_group()?;
        assert_eq!(h.add(vec![MockArgData::Int(Some(1))])?, 0);
        assert_eq!(h.remove(vec![MockArgData::Int(Some(1))])?, 0);
        assert_eq!(h.finish_group()?, Output::Null);
        h.deinit()
    }
}
