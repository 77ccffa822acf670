use std::borrow::Cow;

use udf::prelude::*;

struct BorrowStr(String);

#[register]
impl BasicUdf for BorrowStr {
    type Returns<'a> = &'a str;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self(String::from("value")))
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(&self.0)
    }
}

struct BorrowBytes(Vec<u8>);

#[register]
impl BasicUdf for BorrowBytes {
    type Returns<'a> = Option<&'a [u8]>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self(vec![1, 2, 3]))
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(Some(&self.0))
    }
}

struct BorrowCow(String);

#[register]
impl BasicUdf for BorrowCow {
    type Returns<'a> = Cow<'a, str>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self(String::from("value")))
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        _args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        if self.0.is_empty() {
            Ok(Cow::Owned(String::from("empty")))
        } else {
            Ok(Cow::Borrowed(&self.0))
        }
    }
}

struct OwnBytes;

#[register]
impl BasicUdf for OwnBytes {
    type Returns<'a> = Option<Vec<u8>>;

    fn init(_cfg: &UdfCfg<Init>, _args: &ArgList<Init>) -> Result<Self, String> {
        Ok(Self)
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        Ok(args.get(0).and_then(|a| a.value().as_bytes()).map(<[u8]>::to_vec))
    }
}

fn main() {
    let _: udf::udf_sys::UdfStringFn = borrow_str;
    let _: udf::udf_sys::UdfStringFn = borrow_bytes;
    let _: udf::udf_sys::UdfStringFn = borrow_cow;
    let _: udf::udf_sys::UdfStringFn = own_bytes;
}
