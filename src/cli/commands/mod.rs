pub mod migrate;
pub mod revalidate;
pub mod serve;
pub mod token;
