pub mod classes;
pub mod core;
pub mod exports;
pub mod rounds;
pub mod students;
