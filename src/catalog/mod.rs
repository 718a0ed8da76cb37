//! Static lookup tables: compliments and animal facts

pub mod animal_facts;
pub mod compliments;
