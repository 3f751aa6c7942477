pub mod audio;
pub mod bus;
pub mod convert;
pub mod kernel;
