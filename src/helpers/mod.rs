pub mod lenient;
pub mod time;
