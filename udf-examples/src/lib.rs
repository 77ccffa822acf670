//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Example functions
//!
//! Build with `cargo build --release -p udf-examples`, copy `libudf_examples.so` to the
//! server's `plugin_dir`, then create the functions:
//!
//! ```sql
//! CREATE FUNCTION sum_int RETURNS integer SONAME 'libudf_examples.so';
//! CREATE FUNCTION udf_sequence RETURNS integer SONAME 'libudf_examples.so';
//! CREATE FUNCTION lipsum RETURNS string SONAME 'libudf_examples.so';
//! CREATE FUNCTION udf_attribute RETURNS string SONAME 'libudf_examples.so';
//! CREATE FUNCTION mishmash RETURNS string SONAME 'libudf_examples.so';
//! CREATE FUNCTION is_const RETURNS string SONAME 'libudf_examples.so';
//! CREATE FUNCTION empty_call RETURNS integer SONAME 'libudf_examples.so';
//! CREATE FUNCTION lookup6 RETURNS string SONAME 'libudf_examples.so';
//! CREATE AGGREGATE FUNCTION avg2 RETURNS real SONAME 'libudf_examples.so';
//! CREATE AGGREGATE FUNCTION avg_cost RETURNS real SONAME 'libudf_examples.so';
//! CREATE AGGREGATE FUNCTION udf_median RETURNS integer SONAME 'libudf_examples.so';
//! CREATE AGGREGATE FUNCTION log_calls RETURNS integer SONAME 'libudf_examples.so';
//! ```
mod attribute;
mod avg2;
mod avg_cost;
mod empty;
mod is_const;
mod lipsum;
mod log_calls;
mod lookup;
mod median;
mod mishmash;
mod sequence;
mod sum_int;
