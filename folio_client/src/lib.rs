//! Client side of the portfolio relay: submits the contact and visitor
//! forms, reports the outcome and keeps the local dashboard counters.

pub mod api;
pub mod chatbot;
pub mod form;
pub mod http;
pub mod notify;
pub mod store;
pub mod validation;
