pub mod cursor;
pub mod dump;
pub mod screenshot;
