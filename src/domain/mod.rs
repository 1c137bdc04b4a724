/// Domain layer: the working-copy tree and the value objects it is built from
pub mod entities;
pub mod value_objects;
