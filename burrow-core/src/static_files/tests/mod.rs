mod file_tests;
mod test_helpers;
