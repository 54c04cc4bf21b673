//! Server-side scripts for the Redis store

/// Refill the bucket at `KEYS[1]` and try to take one token
///
/// ARGV: rate, capacity, interval in milliseconds, now in milliseconds.
/// Returns `{allowed, retry_after_ms, tostring(tokens)}`. Redis truncates Lua
/// numbers to integers in replies, so the token count travels as a string.
pub const TOKEN_BUCKET: &str = r#"
local key = KEYS[1]
local rate = tonumber(ARGV[1])
local capacity = tonumber(ARGV[2])
local interval = tonumber(ARGV[3])
local now = tonumber(ARGV[4])

local state = redis.call('HMGET', key, 'tokens', 'timestamp')
local tokens = tonumber(state[1])
local timestamp = tonumber(state[2])

if tokens == nil or timestamp == nil then
    tokens = capacity
    timestamp = now
end

local delta = now - timestamp
if delta > 0 then
    tokens = math.min(capacity, tokens + delta * rate / interval)
    timestamp = now
end

if tokens < 1 then
    redis.call('HSET', key, 'tokens', tostring(tokens), 'timestamp', timestamp)
    redis.call('PEXPIRE', key, interval)
    local wait = math.ceil((1 - tokens) * interval / rate)
    return {0, wait, tostring(tokens)}
end

tokens = tokens - 1
redis.call('HSET', key, 'tokens', tostring(tokens), 'timestamp', timestamp)
redis.call('PEXPIRE', key, interval)
return {1, 0, tostring(tokens)}
"#;
