pub mod driver;
pub mod error;
pub mod sample;

pub use driver::ServerDriver;
pub use error::DriverError;
pub use sample::SampleDriver;
