// ============================
// crates/backend-lib/src/metrics.rs
// ============================
//! Central place for metric keys
pub const USER_REGISTERED: &str = "auth.register";
pub const LOGIN_SUCCEEDED: &str = "auth.login.success";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const AUTH_LOCKOUT: &str = "auth.lockout";
pub const TOKEN_REJECTED: &str = "auth.token.rejected";
pub const RATE_LIMITED: &str = "http.rate_limited";
pub const HISTORY_RECORDED: &str = "history.recorded";

/// Bump a counter by one
pub fn record(key: &'static str) {
    ::metrics::counter!(key).increment(1);
}
