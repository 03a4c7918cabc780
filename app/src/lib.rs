#![recursion_limit = "256"]

pub mod api;
#[cfg(feature = "ssr")]
pub mod api_impl;
pub mod auth;
pub mod backend;
pub mod components;
pub mod components_impl;
#[cfg(feature = "ssr")]
pub mod config;
pub mod error;
pub mod notifier;
pub mod resolver;
pub mod sequencer;
pub mod storage;
pub mod types;
