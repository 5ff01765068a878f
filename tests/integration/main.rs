//! End-to-end tests over the services and the text menu

mod circulation_tests;
mod menu_tests;
