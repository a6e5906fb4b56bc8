//! End-to-end tests against a running server, see `api_tests`

mod api_tests;
