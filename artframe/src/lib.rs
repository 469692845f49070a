pub mod channel;
pub mod controller;
pub mod core;
pub mod frames;
pub mod prelude;
pub mod protocol;
pub mod renderer;
pub mod runtime;
