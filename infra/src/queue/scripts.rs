//! Lua scripts that keep each queue transition atomic.
//!
//! A job lives in a hash `{prefix}:email:job:{id}` with the fields `job`
//! (the JSON envelope as enqueued), `state`, `attempts_made`, `last_error`
//! and `failed_at`. Its id sits in exactly one of the waiting list, the
//! active sorted set (scored by lease deadline in ms) or the failed sorted
//! set (scored by failure time in ms).

use redis::Script;

/// KEYS: waiting, active. ARGV: now_ms, deadline_ms, job key prefix.
/// Returns the leased id or nil.
const LEASE: &str = r#"
local expired = redis.call('ZRANGEBYSCORE', KEYS[2], '-inf', ARGV[1])
for _, id in ipairs(expired) do
  redis.call('ZREM', KEYS[2], id)
  redis.call('HSET', ARGV[3] .. id, 'state', 'waiting')
  redis.call('RPUSH', KEYS[1], id)
end
while true do
  local id = redis.call('LPOP', KEYS[1])
  if not id then
    return false
  end
  local key = ARGV[3] .. id
  if redis.call('HGET', key, 'state') == 'waiting' then
    redis.call('HSET', key, 'state', 'active')
    redis.call('ZADD', KEYS[2], ARGV[2], id)
    return id
  end
end
"#;

/// KEYS: active, job. ARGV: id, deadline_ms. Returns 1 if the lease was
/// still held and has been moved.
const EXTEND_LEASE: &str = r#"
if redis.call('HGET', KEYS[2], 'state') ~= 'active' then
  return 0
end
if not redis.call('ZSCORE', KEYS[1], ARGV[1]) then
  return 0
end
redis.call('ZADD', KEYS[1], 'XX', ARGV[2], ARGV[1])
return 1
"#;

/// KEYS: active, job. ARGV: id, error. Returns 1 if recorded.
const RECORD_FAILURE: &str = r#"
if not redis.call('ZSCORE', KEYS[1], ARGV[1]) then
  return 0
end
redis.call('HINCRBY', KEYS[2], 'attempts_made', 1)
redis.call('HSET', KEYS[2], 'last_error', ARGV[2])
return 1
"#;

/// KEYS: active, waiting, job. ARGV: id. Returns 1 if the job was removed.
const COMPLETE: &str = r#"
redis.call('ZREM', KEYS[1], ARGV[1])
if redis.call('HGET', KEYS[3], 'state') == 'failed' then
  return 0
end
redis.call('LREM', KEYS[2], 0, ARGV[1])
return redis.call('DEL', KEYS[3])
"#;

/// KEYS: active, waiting, failed, job. ARGV: id, error, now_ms, now_rfc3339.
/// Returns 1 if the job moved to the failed set.
const FAIL: &str = r#"
local state = redis.call('HGET', KEYS[4], 'state')
if not state or state == 'failed' then
  return 0
end
redis.call('ZREM', KEYS[1], ARGV[1])
redis.call('LREM', KEYS[2], 0, ARGV[1])
redis.call('HSET', KEYS[4], 'state', 'failed', 'last_error', ARGV[2], 'failed_at', ARGV[4])
redis.call('ZADD', KEYS[3], ARGV[3], ARGV[1])
return 1
"#;

pub(super) struct QueueScripts {
    pub lease: Script,
    pub extend_lease: Script,
    pub record_failure: Script,
    pub complete: Script,
    pub fail: Script,
}

impl QueueScripts {
    pub fn new() -> Self {
        Self {
            lease: Script::new(LEASE),
            extend_lease: Script::new(EXTEND_LEASE),
            record_failure: Script::new(RECORD_FAILURE),
            complete: Script::new(COMPLETE),
            fail: Script::new(FAIL),
        }
    }
}
