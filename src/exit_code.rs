use crate::error::JarcatError;

pub fn exit_code_for_error(err: &JarcatError) -> i32 {
    match err {
        JarcatError::Config(_) => 2,
        JarcatError::InvalidUrl(_) => 3,
        JarcatError::Unsupported(_) => 4,
        JarcatError::Collector(_) => 22,
        JarcatError::Io(_) => 23,
        JarcatError::Json(_) => 26,
        JarcatError::PermissionDenied(_) | JarcatError::FileNotFound(_) => 37,
        JarcatError::Store(_) => 43,
        JarcatError::Http(err) => http_exit_code(err),
    }
}

fn http_exit_code(err: &reqwest::Error) -> i32 {
    if err.is_timeout() {
        return 28;
    }
    if err.is_connect() {
        return 7;
    }
    if err.is_request() {
        return 2;
    }
    43
}
