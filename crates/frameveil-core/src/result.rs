use crate::error::FrameveilError;

pub type Result<T> = std::result::Result<T, FrameveilError>;
