struct Constant;

#[udf::register(name = "the_answer")]
impl udf::traits::BasicUdf for Constant {
    type Returns<'a> = i64;

    fn init(
        cfg: &udf::UdfCfg<udf::Init>,
        _args: &udf::ArgList<udf::Init>,
    ) -> Result<Self, String> {
        cfg.set_is_const(true);
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &udf::UdfCfg<udf::Process>,
        _args: &udf::ArgList<udf::Process>,
        _error: Option<std::num::NonZeroU8>,
    ) -> Result<Self::Returns<'a>, udf::ProcessError> {
        Ok(42)
    }
}

fn main() {
    let _: udf::udf_sys::UdfLongLongFn = the_answer;
}
