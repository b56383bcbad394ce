pub mod databases;
pub mod fields;
pub mod general;
pub mod projects;
pub mod tables;
