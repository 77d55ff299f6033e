mod path_tests;
