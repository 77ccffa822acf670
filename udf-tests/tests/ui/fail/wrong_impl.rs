#![allow(unused)]

use std::ops::Add;

use udf::prelude::*;

struct Meters(u32);

#[register]
impl Add for Meters {
    type Output = Meters;

    fn add(self, other: Self) -> Meters {
        Meters(self.0 + other.0)
    }
}

#[register]
impl Meters {
    fn zero() -> Self {
        Meters(0)
    }
}

fn main() {}
