pub mod contexts;
pub mod create;
pub mod fetch;
