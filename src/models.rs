// src/models.rs

pub mod entity;
pub mod office;
pub mod auth;

pub mod driver;
pub mod vehicle;
pub mod contract;
pub mod payment;
pub mod document;
pub mod alert;
pub mod notification;
