mod content_tests;
mod logic_tests;
