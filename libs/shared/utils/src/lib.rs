pub mod formatting;
pub mod test_utils;
