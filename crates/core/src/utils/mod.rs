pub mod cancellation;
