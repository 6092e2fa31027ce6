//! Mode routing
//!
//! 目前只有 HTTP 服务器模式；`migrate` 与 `config generate` 由 main 直接处理。

pub mod server;

pub use server::{configure_app, run_server};
