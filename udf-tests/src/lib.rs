//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! End-to-end tests for `udf`, and the harness that runs them
//!
//! The harness plays the server: it resolves a function's exported symbols and calls them in
//! the order and with the memory layout the server would. See [`UdfHarness`].
mod framework;
#[cfg(feature = "proptest")]
pub mod proptest;
#[cfg(test)]
mod tests;

pub use framework::*;
