pub mod client;

pub use client::HttpDietApi;
