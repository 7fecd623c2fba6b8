pub(crate) mod common;
mod employee;
