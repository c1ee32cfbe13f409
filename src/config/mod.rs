mod seed;

pub use seed::{Seed, SeedEntry, SeedError};
