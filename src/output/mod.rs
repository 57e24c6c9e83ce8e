pub mod trajectory;
pub mod checkpoint;
