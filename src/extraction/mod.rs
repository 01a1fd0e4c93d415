//! 提取层
//!
//! 规则目录（`rules`）是数据，引擎（`engine`）是单个通用求值器。
//! 整层不做任何 I/O。

pub mod engine;
pub mod rules;

pub use engine::extract;
