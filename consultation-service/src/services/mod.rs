pub mod prompt;
pub mod providers;
pub mod sse;
