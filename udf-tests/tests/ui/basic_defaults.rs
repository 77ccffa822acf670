use udf::prelude::*;

struct SumInt;

#[register]
impl BasicUdf for SumInt {
    type Returns<'a> = i64;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
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

fn main() {
    let _: udf::udf_sys::UdfInitFn = sum_int_init;
    let _: udf::udf_sys::UdfDeinitFn = sum_int_deinit;
    let _: udf::udf_sys::UdfLongLongFn = sum_int;
}
