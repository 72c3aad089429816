//! 导入服务层

pub mod import_service;

pub use import_service::{ImportOptions, ImportService};
