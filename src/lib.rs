// Library interface so the pipeline modules are reachable from integration tests.

pub mod graphics;
pub mod rotation;
pub mod sample;
pub mod session;
pub mod state;
pub mod transport;
pub mod vertex;
pub mod widget;
pub mod window;
