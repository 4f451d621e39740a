pub mod scan_handler;

pub use scan_handler::{format_report, ScanHandler};
