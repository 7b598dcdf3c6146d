//! Property-based tests for the container

mod container_properties;
