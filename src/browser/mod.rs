//! 渲染客户端
//!
//! 两种获得浏览器的方式（connection: 连接已运行的调试端口；
//! headless: 自行启动无头实例），以及把页面物化为
//! `DocumentSnapshot` 的 `PageFetcher`

pub mod connection;
pub mod fetcher;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use fetcher::{DocumentSource, PageFetcher};
pub use headless::launch_headless_browser;
