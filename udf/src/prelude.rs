//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! `use udf::prelude::*;` to get everything a function implementation usually needs
pub use crate::register;
pub use crate::traits::{AggregateUdf, BasicUdf};
pub use crate::types::{
    ArgList, Init, Process, ProcessError, SqlArg, SqlResult, SqlType, UdfCfg,
};
pub use crate::udf_log;
pub use std::num::NonZeroU8;
