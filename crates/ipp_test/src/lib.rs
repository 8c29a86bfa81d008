pub mod mock;
pub mod sse;
