//! Maps a parsed command to a store operation and formats the reply bytes.
use crate::protocol::{Command, ParseOutcome};
use crate::store::{SetOutcome, Store};

/// Runs one parsed record against the store. Returns `None` when no reply
/// should be sent (unknown verbs, matching the reference's silent drop).
pub fn dispatch(store: &mut Store, outcome: ParseOutcome, now: u64) -> Option<Vec<u8>> {
    match outcome {
        ParseOutcome::Malformed => Some(b"ERROR malformed\n".to_vec()),
        ParseOutcome::Unknown => None,
        ParseOutcome::Command(Command::Set { key, value, ttl }) => {
            match store.set(&key, &value, ttl, now) {
                SetOutcome::Stored => Some(b"OK\n".to_vec()),
                SetOutcome::InvalidArgs => Some(b"ERROR: SET needs key and value\n".to_vec()),
            }
        }
        ParseOutcome::Command(Command::Get { key }) => match store.get(&key, now) {
            Some(mut value) => {
                value.push(b'\n');
                Some(value)
            }
            None => Some(b"Key not found\n".to_vec()),
        },
        ParseOutcome::Command(Command::Del { key }) => {
            store.delete(&key);
            Some(b"DELETED\n".to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_record;

    fn run(store: &mut Store, record: &[u8], now: u64) -> Option<Vec<u8>> {
        dispatch(store, parse_record(record), now)
    }

    #[test]
    fn scenario_set_then_get() {
        let mut store = Store::new(3);
        assert_eq!(run(&mut store, b"SET a 1", 1000), Some(b"OK\n".to_vec()));
        assert_eq!(run(&mut store, b"GET a", 1000), Some(b"1\n".to_vec()));
    }

    #[test]
    fn scenario_get_missing() {
        let mut store = Store::new(3);
        assert_eq!(
            run(&mut store, b"GET missing", 1000),
            Some(b"Key not found\n".to_vec())
        );
    }

    #[test]
    fn scenario_lru_eviction_via_dispatch() {
        let mut store = Store::new(3);
        assert_eq!(run(&mut store, b"SET a 1", 1000), Some(b"OK\n".to_vec()));
        assert_eq!(run(&mut store, b"SET b 2", 1000), Some(b"OK\n".to_vec()));
        assert_eq!(run(&mut store, b"SET c 3", 1000), Some(b"OK\n".to_vec()));
        assert_eq!(run(&mut store, b"GET a", 1000), Some(b"1\n".to_vec()));
        assert_eq!(run(&mut store, b"SET d 4", 1000), Some(b"OK\n".to_vec()));
        assert_eq!(
            run(&mut store, b"GET b", 1000),
            Some(b"Key not found\n".to_vec())
        );
    }

    #[test]
    fn scenario_ttl_expiry() {
        let mut store = Store::new(3);
        assert_eq!(
            run(&mut store, b"SET k v EX 1", 1000),
            Some(b"OK\n".to_vec())
        );
        assert_eq!(
            run(&mut store, b"GET k", 1002),
            Some(b"Key not found\n".to_vec())
        );
    }

    #[test]
    fn scenario_malformed_record() {
        let mut store = Store::new(3);
        assert_eq!(
            run(&mut store, b"set", 1000),
            Some(b"ERROR malformed\n".to_vec())
        );
    }

    #[test]
    fn scenario_set_missing_args_then_idempotent_delete() {
        let mut store = Store::new(3);
        assert_eq!(
            run(&mut store, b"SET", 1000),
            Some(b"ERROR malformed\n".to_vec())
        );
        assert_eq!(
            run(&mut store, b"SET x", 1000),
            Some(b"ERROR: SET needs key and value\n".to_vec())
        );
        assert_eq!(
            run(&mut store, b"DEL nonexistent", 1000),
            Some(b"DELETED\n".to_vec())
        );
    }

    #[test]
    fn unknown_verb_produces_no_reply() {
        let mut store = Store::new(3);
        assert_eq!(run(&mut store, b"PING x", 1000), None);
    }
}
