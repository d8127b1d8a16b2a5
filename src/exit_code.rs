use crate::error::CookieMasterError;

pub fn exit_code_for_error(err: &CookieMasterError) -> i32 {
    match err {
        CookieMasterError::InvalidUrl(_) => 3,
        CookieMasterError::Config(_) | CookieMasterError::InvalidInput(_) => 2,
        CookieMasterError::UnsupportedScheme(_) => 4,
        CookieMasterError::NoActiveTab => 5,
        CookieMasterError::NotFound(_) => 6,
        CookieMasterError::Rejected(message) => rejection_exit_code(message),
        CookieMasterError::Storage(_) | CookieMasterError::Database(_) => 20,
        CookieMasterError::Io(_) => 23,
        CookieMasterError::Json(_) => 26,
    }
}

fn rejection_exit_code(message: &str) -> i32 {
    let lower = message.to_ascii_lowercase();
    if lower.contains("domain") {
        return 11;
    }
    if lower.contains("secure") {
        return 12;
    }
    10
}
