//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `lipsum`: placeholder text of a given number of words
//!
//! An optional second argument seeds the generator, so the same seed gives the same text.
//!
//! ```sql
//! SELECT lipsum(8);
//! SELECT lipsum(8, 42);
//! ```
use ::lipsum::{lipsum as lipsum_words, lipsum_from_seed};
use udf::prelude::*;

/// Enough to fill a `LONGTEXT`
const MAX_WORDS: i64 = (u32::MAX >> 4) as i64;

fn check_count(n: i64) -> Result<usize, String> {
    if n < 0 {
        return Err(format!("word count must not be negative, got {n}"));
    }
    if n > MAX_WORDS {
        return Err(format!("maximum of {MAX_WORDS} words, got {n}"));
    }
    Ok(n as usize)
}

struct Lipsum {
    res: String,
}

#[register]
impl BasicUdf for Lipsum {
    type Returns<'a> = &'a str;

    fn init(_cfg: &UdfCfg<Init>, args: &ArgList<Init>) -> Result<Self, String> {
        if args.is_empty() || args.len() > 2 {
            return Err(format!("expected 1 or 2 args; got {}", args.len()));
        }

        for mut arg in args {
            // constants can be checked now, the rest is checked per row
            if let Some(v) = arg.value().as_int() {
                if arg.index() == 0 {
                    check_count(v)?;
                } else if v < 0 {
                    return Err(format!("seed must not be negative, got {v}"));
                }
            }
            arg.set_type_coercion(SqlType::Int);
        }

        Ok(Self { res: String::new() })
    }

    fn process<'a>(
        &'a mut self,
        _cfg: &UdfCfg<Process>,
        args: &ArgList<Process>,
        _error: Option<NonZeroU8>,
    ) -> Result<Self::Returns<'a>, ProcessError> {
        let n = args.get(0).and_then(|a| a.value().as_int()).ok_or(ProcessError)?;
        let n = check_count(n).map_err(|_| ProcessError)?;

        self.res = match args.get(1) {
            Some(seed) => {
                let seed = seed.value().as_int().ok_or(ProcessError)?;
                lipsum_from_seed(n, seed.unsigned_abs())
            }
            None => lipsum_words(n),
        };

        Ok(&self.res)
    }
}
