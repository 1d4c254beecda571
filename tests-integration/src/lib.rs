//! No library surface of its own - this crate only hosts the integration
//! suite under `tests/`, exercising `broker` as a black box over real
//! sockets.
