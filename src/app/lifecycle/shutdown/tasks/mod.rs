pub mod flush_logs;
pub mod stop_session;
