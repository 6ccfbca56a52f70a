// Bloomload Infrastructure - HTTP Adapter
// Implements: RequestSender

pub mod reqwest_sender;

pub use reqwest_sender::{HttpClientConfig, ReqwestSender};
