//! HTTP surface for the agriculture field assistant.

pub mod api;
pub mod http;
pub mod service;
