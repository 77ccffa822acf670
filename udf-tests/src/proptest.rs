//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Property tests that run through [`UdfHarness`](crate::UdfHarness)
use ::proptest::strategy::Strategy;
use ::proptest::test_runner::{TestCaseError, TestError, TestRunner};

/// A [`TestRunner`] whose cases return `eyre::Result`, so harness errors fail the case
/// with their whole report
#[derive(Default)]
pub struct UdfTestRunner(TestRunner);

impl UdfTestRunner {
    pub fn new(runner: TestRunner) -> Self {
        Self(runner)
    }

    pub fn run<S: Strategy>(
        &mut self,
        strategy: &S,
        test: impl Fn(S::Value) -> eyre::Result<()>,
    ) -> Result<(), TestError<<S as Strategy>::Value>> {
        self.0.run(strategy, |value| test(value).map_err(|e| TestCaseError::fail(format!("{e:?}"))))
    }
}
