//! Durable notification job queue backed by Redis.

pub mod redis_queue;
mod scripts;

pub use redis_queue::{QueueCounts, RedisJobQueue};
