use udf::prelude::*;

#[derive(Default)]
struct Avg {
    sum: f64,
    count: u64,
}

#[register(name = "avg_real", alias = "mean", alias = "average")]
impl BasicUdf for Avg {
    type Returns<'a> = Option<f64>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self::default())
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok((self.count > 0).then(|| self.sum / self.count as f64))
    }
}

#[register(name = "avg_real", alias = "mean", alias = "average")]
impl AggregateUdf for Avg {
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
        if let Some(v) = args.get(0).and_then(|a| a.value().as_real()) {
            self.sum += v;
            self.count += 1;
        }
        Ok(())
    }

    fn remove(
        &mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<(), NonZeroU8> {
        if let Some(v) = args.get(0).and_then(|a| a.value().as_real()) {
            self.sum -= v;
            self.count -= 1;
        }
        Ok(())
    }
}

fn main() {
    let _: udf::udf_sys::UdfDoubleFn = avg_real;
    let _: udf::udf_sys::UdfDoubleFn = mean;
    let _: udf::udf_sys::UdfDoubleFn = average;
    let _: udf::udf_sys::UdfClearFn = mean_clear;
    let _: udf::udf_sys::UdfAddFn = average_add;
    let _: udf::udf_sys::UdfAddFn = avg_real_remove;
}
