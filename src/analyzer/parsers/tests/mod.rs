mod json_test;
