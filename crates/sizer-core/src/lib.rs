pub mod config;
pub mod consts;
pub mod crop;
pub mod error;
pub mod form;
pub mod ratio;
pub mod selection;
pub mod upload;
pub mod workbench;
