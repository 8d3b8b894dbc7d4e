//! Integration tests for the console shell
//! These tests drive the client, stores and router together over real HTTP

// Import the test harness
pub mod test_harness;

// Import individual test modules
pub mod api_client_test;
pub mod session_flow_test;
pub mod shell_test;
pub mod theme_sync_test;
