#![allow(unused)]

use udf::prelude::*;

struct Misspelled;
struct TwoNames;
struct NumberName;

#[register(nme = "misspelled")]
impl BasicUdf for Misspelled {
    type Returns<'a> = Option<i64>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(None)
    }
}

#[register(name = "one", name = "two")]
impl BasicUdf for TwoNames {
    type Returns<'a> = Option<i64>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(None)
    }
}

#[register(name = 1)]
impl BasicUdf for NumberName {
    type Returns<'a> = Option<i64>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(None)
    }
}

fn main() {}
