pub mod config;
pub mod logging;

pub mod archive;
pub mod assemble;
pub mod checksum;
pub mod fetch;
pub mod pipeline;
pub mod readme;
pub mod url_model;
pub mod version;
