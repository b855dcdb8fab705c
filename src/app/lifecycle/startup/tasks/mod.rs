pub mod config_load;
pub mod observability;
pub mod session_start;
pub mod storage_open;
