//! Realtime outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `RealtimePublisher` port for the hosted pub/sub service.

mod http_publisher;

pub use http_publisher::HttpRealtimePublisher;
