pub mod city;
pub mod weather;

pub use city::*;
pub use weather::*;
