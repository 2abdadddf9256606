//! Implementation of search problems.
//!
//! Each problem binds its own states, actions and costs to the generic
//! `Problem` API so any search algorithm can solve it.

pub mod cities;
pub mod labyrinth;
pub mod pour;
