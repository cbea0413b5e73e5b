//! Row models.

pub mod employee;
