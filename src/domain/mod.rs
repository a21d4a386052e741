pub mod project;
pub mod schedule;
pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_util;
