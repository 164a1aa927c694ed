mod fallback_tests;
mod helpers;
