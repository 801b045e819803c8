pub mod compare;
pub mod db;
pub mod dialect;
pub mod forms;
pub mod model;
pub mod parser;
pub mod selection;
pub mod settings;
