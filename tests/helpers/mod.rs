#![allow(dead_code)]

pub mod document_builder;
pub mod mock_config;
