pub mod archive;
pub mod classification;
pub mod report;
pub mod segmentation;
pub mod validator;

pub mod error;
