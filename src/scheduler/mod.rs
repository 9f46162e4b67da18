//! Task ordering.
//!
//! The scheduler decides which pending task a worker takes next: the one with
//! the greatest priority, earliest submission first among equals.

pub mod priority;

pub use priority::PriorityQueue;
