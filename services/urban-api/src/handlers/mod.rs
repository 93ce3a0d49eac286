//! HTTP request handlers for the urban API.

pub mod health;
pub mod pages;
pub mod process;
