mod basic_tests;

use udf::mock::MockArgData;

fn int(v: i64) -> MockArgData {
    MockArgData::Int(Some(v))
}

fn real(v: f64) -> MockArgData {
    MockArgData::Real(Some(v))
}

fn string(v: &str) -> MockArgData {
    MockArgData::String(Some(v.to_owned()))
}
