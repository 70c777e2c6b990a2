pub mod backoff;
pub(crate) mod time;
pub mod wait;

#[cfg(test)]
mod backoff_test;
