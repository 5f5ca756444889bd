//! Server-side batch script
//!
//! SCAN and the per-key metadata commands run inside one Lua script, which
//! Redis executes atomically. A key deleted between SCAN and TYPE would
//! otherwise yield a record stitched together from two points in time.
//!
//! ARGV[1] = cursor, ARGV[2] = MATCH glob, ARGV[3] = COUNT.
//! Reply: `{next_cursor, {{key, type, ttl, memory, size}, ...}}`.

use crate::error::{StoreError, StoreResult};
use crate::scan::types::{KeyRecord, KeyType, ScanBatch, ScanCursor};

/// Lua source of the batch script
pub const SCAN_BATCH_SCRIPT: &str = r#"
local scan = redis.call('SCAN', ARGV[1], 'MATCH', ARGV[2], 'COUNT', tonumber(ARGV[3]))
local result = {}

local function size_of(key, key_type)
    if key_type == 'string' then
        return redis.call('STRLEN', key)
    elseif key_type == 'list' then
        return redis.call('LLEN', key)
    elseif key_type == 'set' then
        return redis.call('SCARD', key)
    elseif key_type == 'zset' then
        return redis.call('ZCARD', key)
    elseif key_type == 'hash' then
        return redis.call('HLEN', key)
    end
    return 0
end

for _, key in ipairs(scan[2]) do
    local key_type = redis.call('TYPE', key)['ok']
    local ttl = redis.call('TTL', key)
    local memory = redis.call('MEMORY', 'USAGE', key) or 0
    table.insert(result, {key, key_type, ttl, memory, size_of(key, key_type)})
end

return {scan[1], result}
"#;

/// Raw per-key row as decoded from the script reply
pub type RawKeyRow = (Vec<u8>, String, i64, u64, u64);

/// Raw script reply
pub type RawBatchReply = (String, Vec<RawKeyRow>);

/// Turn a raw script reply into a typed batch
pub fn decode_batch(reply: RawBatchReply) -> StoreResult<ScanBatch> {
    let (cursor, rows) = reply;

    let next_cursor = cursor
        .parse::<u64>()
        .map(ScanCursor)
        .map_err(|e| StoreError::MalformedReply {
            command: "SCAN".to_string(),
            reason: format!("cursor '{}': {}", cursor, e),
        })?;

    let records = rows
        .into_iter()
        .map(|(key, key_type, ttl, memory, size)| KeyRecord {
            key: String::from_utf8_lossy(&key).into_owned(),
            key_type: KeyType::from_redis_type(&key_type),
            ttl,
            memory,
            size,
        })
        .collect();

    Ok(ScanBatch {
        next_cursor,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_batch() {
        let reply = (
            "1536".to_string(),
            vec![
                (b"user:1".to_vec(), "string".to_string(), 3600, 72, 5),
                (b"queue:jobs".to_vec(), "list".to_string(), -1, 1024, 40),
                (b"gone".to_vec(), "none".to_string(), -2, 0, 0),
            ],
        );

        let batch = decode_batch(reply).unwrap();
        assert_eq!(batch.next_cursor, ScanCursor(1536));
        assert_eq!(batch.records.len(), 3);
        assert_eq!(
            batch.records[0],
            KeyRecord::new("user:1", KeyType::String, 3600, 72, 5)
        );
        assert_eq!(batch.records[1].key_type, KeyType::List);
        assert_eq!(batch.records[2].key_type, KeyType::Unknown);
        assert_eq!(batch.records[2].ttl, -2);
    }

    #[test]
    fn test_decode_from_wire_value() {
        use redis::Value;

        // Shape returned by the script: {cursor, {{key, type, ttl, memory, size}, ...}}
        let wire = Value::Array(vec![
            Value::BulkString(b"17".to_vec()),
            Value::Array(vec![
                Value::Array(vec![
                    Value::BulkString(b"k".to_vec()),
                    Value::BulkString(b"string".to_vec()),
                    Value::Int(-1),
                    Value::Int(56),
                    Value::Int(3),
                ]),
                Value::Array(vec![
                    Value::BulkString(b"orders".to_vec()),
                    Value::BulkString(b"zset".to_vec()),
                    Value::Int(120),
                    Value::Int(0),
                    Value::Int(9),
                ]),
            ]),
        ]);

        let reply: RawBatchReply = redis::from_redis_value(&wire).unwrap();
        let batch = decode_batch(reply).unwrap();
        assert_eq!(batch.next_cursor, ScanCursor(17));
        assert_eq!(
            batch.records,
            vec![
                KeyRecord::new("k", KeyType::String, -1, 56, 3),
                KeyRecord::new("orders", KeyType::SortedSet, 120, 0, 9),
            ]
        );
    }

    #[test]
    fn test_decode_empty_wire_value() {
        use redis::Value;

        let wire = Value::Array(vec![
            Value::BulkString(b"0".to_vec()),
            Value::Array(Vec::new()),
        ]);

        let reply: RawBatchReply = redis::from_redis_value(&wire).unwrap();
        let batch = decode_batch(reply).unwrap();
        assert!(batch.next_cursor.is_start());
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_decode_final_batch() {
        let batch = decode_batch(("0".to_string(), Vec::new())).unwrap();
        assert!(batch.next_cursor.is_start());
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_decode_non_utf8_key() {
        let reply = (
            "0".to_string(),
            vec![(vec![b'k', 0xff, b'1'], "string".to_string(), -1, 50, 1)],
        );
        let batch = decode_batch(reply).unwrap();
        assert_eq!(batch.records[0].key, "k\u{fffd}1");
    }

    #[test]
    fn test_decode_bad_cursor() {
        let err = decode_batch(("next".to_string(), Vec::new())).unwrap_err();
        assert!(matches!(err, StoreError::MalformedReply { .. }));
    }

    #[test]
    fn test_script_takes_arguments() {
        // Glob and count come from ARGV, never spliced into the source
        assert!(SCAN_BATCH_SCRIPT.contains("ARGV[2]"));
        assert!(SCAN_BATCH_SCRIPT.contains("tonumber(ARGV[3])"));
        assert!(SCAN_BATCH_SCRIPT.contains("'MEMORY', 'USAGE'"));
    }
}
