use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod heap_primitives;

// Search space and problems
// -------------------------
pub mod cost;
pub mod float_cost;
pub mod problem;
pub mod space;

// Search
// ------
pub mod frontier;
pub mod search;

pub mod algorithms;
pub mod problems;
