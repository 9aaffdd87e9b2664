pub mod handlers;
pub mod router;

#[cfg(test)]
mod tests;

pub use router::router;
