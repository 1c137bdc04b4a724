/// Application layer: the traversal engine and the commands it runs
pub mod services;
pub mod use_cases;
