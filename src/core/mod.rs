// src/core/mod.rs
pub mod builder;
pub mod engine;
pub mod registry;
pub mod segmenter;
pub mod types;
pub mod validator;
