//! HTTP Route Handlers

pub mod auth;
pub mod customers;
pub mod predictions;
pub mod tables;
