pub mod classification;
pub mod frame;
pub mod region;
pub mod settings;
