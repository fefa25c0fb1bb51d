/// @Summary Should never be documented
/// @Router /from-test-file [get]
pub fn from_test_file() {}
