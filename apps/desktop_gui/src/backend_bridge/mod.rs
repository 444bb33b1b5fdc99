//! Bridge between the transport workers and the egui frame loop.

pub mod runtime;
