/// Application name
pub const APP_NAME: &str = "HIM Admin";

/// Fallback backend base URL when no environment override is set
pub const DEFAULT_API_BASE_URL: &str = "https://api.mysuperhero.xyz";

/// Environment variables consulted for the backend base URL, in order
pub const ENV_API_BASE_URL: &str = "HIM_API_BASE_URL";
pub const ENV_API_BASE_URL_LEGACY: &str = "API_BASE_URL";

/// Error text reported when the backend could not be reached at all
pub const BACKEND_UNREACHABLE: &str = "backend_unreachable";

/// Error text reported when a 2xx body does not match the expected schema
pub const INVALID_JSON: &str = "invalid_json";

/// Server-rendered session cookies
pub const COOKIE_ACCESS: &str = "him_admin_access";
pub const COOKIE_REFRESH: &str = "him_admin_refresh";
pub const COOKIE_USER: &str = "him_admin_user";

/// Short-lived cookies carrying state between OTP start and verify
pub const COOKIE_LOGIN_PHONE: &str = "him_admin_login_phone";
pub const COOKIE_LOGIN_DEV_OTP: &str = "him_admin_login_dev_otp";

/// Cookie lifetimes in seconds
pub const ACCESS_COOKIE_MAX_AGE: i64 = 15 * 60;
pub const REFRESH_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;
pub const LOGIN_FLOW_COOKIE_MAX_AGE: i64 = 10 * 60;

/// Client-rendered local storage keys
pub const STORAGE_ACCESS_KEY: &str = "superheroo_admin_access";
pub const STORAGE_REFRESH_KEY: &str = "superheroo_admin_refresh";
pub const STORAGE_USER_KEY: &str = "superheroo_admin_user";

/// Number of tasks shown in the dashboard's recent list
pub const RECENT_TASKS_LIMIT: usize = 5;

/// Reason sent when an admin rejects KYC without typing one
pub const DEFAULT_REJECT_REASON: &str = "Rejected";

/// Backend endpoints
pub mod endpoints {
    pub const OTP_START: &str = "/api/v1/auth/otp/start";
    pub const OTP_VERIFY: &str = "/api/v1/auth/otp/verify";
    pub const PASSWORD_LOGIN: &str = "/api/v1/auth/password/login";
    pub const PASSWORD_SIGNUP: &str = "/api/v1/auth/password/signup";
    pub const HELPER_KYC_SIGNUP: &str = "/api/v1/auth/password/signup/helper-kyc";

    pub const ADMIN_SUMMARY: &str = "/api/v1/admin/summary";
    pub const ADMIN_BUYERS: &str = "/api/v1/admin/buyers";
    pub const ADMIN_HELPERS: &str = "/api/v1/admin/helpers";
    pub const ADMIN_PENDING_HELPERS: &str = "/api/v1/admin/helpers/pending";
    pub const ADMIN_USERS: &str = "/api/v1/admin/users";
    pub const ADMIN_TASKS: &str = "/api/v1/admin/tasks";
    pub const ADMIN_RECENT_TASKS: &str = "/api/v1/admin/tasks/recent";
    pub const ADMIN_TICKETS: &str = "/api/v1/admin/support/tickets";
}
