use crate::message::Operation;
use crate::store::Store;

/// Applies a decided operation to the store. Returns whether the key was
/// present beforehand.
///
/// Application is unconditional: operations on the same key are ordered
/// only by the order in which their `learn` calls arrive.
pub(crate) fn apply(id: u64, store: &mut Store, operation: &Operation) -> bool {
    match operation {
    | Operation::Put { key, value } => {
        info!("{} stored {} = {}", id, key, value);
        store.insert(key.clone(), value.clone()).is_some()
    }
    | Operation::Delete { key } => {
        let existed = store.remove(key).is_some();
        if existed {
            info!("{} deleted {}", id, key);
        } else {
            debug!("{} ignored delete of missing {}", id, key);
        }
        existed
    }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn put_upserts_and_delete_removes() {
        let mut store = Store::default();
        assert!(!apply(0, &mut store, &Operation::put("Hobby", "Cycling").unwrap()));
        assert!(apply(0, &mut store, &Operation::put("Hobby", "Chess").unwrap()));
        assert_eq!(store.get("Hobby").map(String::as_str), Some("Chess"));
        assert!(apply(0, &mut store, &Operation::delete("Hobby").unwrap()));
        assert!(!apply(0, &mut store, &Operation::delete("Hobby").unwrap()));
        assert!(store.is_empty());
    }

    #[test]
    fn last_learned_wins() {
        let mut store = Store::default();
        apply(0, &mut store, &Operation::put("k", "second").unwrap());
        apply(0, &mut store, &Operation::put("k", "first").unwrap());
        assert_eq!(store.get("k").map(String::as_str), Some("first"));
    }
}
