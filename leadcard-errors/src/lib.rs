mod app_error;

pub use app_error::{AppError, RETRY_LATER_MESSAGE};
