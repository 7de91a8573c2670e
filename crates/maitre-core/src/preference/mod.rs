//! Customer preference domain module.

mod model;

pub use model::{ADVENTUROUSNESS_MAX, Customer, CustomerPreferences};
