//! IndexStore trait and RocksDB implementation
//!
//! Provides persistent storage for indexed contract activity.
//! Contracts and transactions are upserted by key; events are append-only
//! rows with ids drawn from a persisted counter.

use crate::keys::{
    decode_event_key, encode_contract_key, encode_event_key, encode_meta_key,
    encode_transaction_key,
};
use crate::records::{ContractRecord, EventRecord, TransactionRecord};
use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::path::Path;

/// Meta id for the next event row id.
const META_NEXT_EVENT_ID: u8 = 0x01;

/// Trait defining the storage port for indexed contract activity.
///
/// Contracts are keyed by address and transactions by hash, both with
/// overwrite semantics. Events are append-only: inserting twice stores
/// two rows.
pub trait IndexStore {
    /// Ensure the storage schema exists. Idempotent.
    fn ensure_schema(&self) -> Result<()>;

    /// Insert or overwrite contract metadata, keyed by address.
    fn upsert_contract(&self, record: &ContractRecord) -> Result<()>;

    /// Get contract metadata by address.
    fn get_contract(&self, address: Address) -> Result<Option<ContractRecord>>;

    /// Insert or overwrite a transaction, keyed by hash.
    fn upsert_transaction(&self, record: &TransactionRecord) -> Result<()>;

    /// Get a transaction by hash.
    fn get_transaction(&self, hash: B256) -> Result<Option<TransactionRecord>>;

    /// Append an event row, returning its generated id.
    fn insert_event(&self, record: &EventRecord) -> Result<u64>;

    /// List all event rows in insertion order.
    fn list_events(&self) -> Result<Vec<(u64, EventRecord)>>;
}

/// RocksDB-backed implementation of IndexStore.
///
/// Uses column families to organize different types of data:
/// - contracts: contract metadata records
/// - transactions: transaction records
/// - events: event rows keyed by generated id
/// - meta: metadata (event id counter)
pub struct RocksIndexStore {
    db: DB,
}

impl RocksIndexStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all required column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let column_families = vec![
            ColumnFamilyDescriptor::new("contracts", Options::default()),
            ColumnFamilyDescriptor::new("transactions", Options::default()),
            ColumnFamilyDescriptor::new("events", Options::default()),
            ColumnFamilyDescriptor::new("meta", Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, column_families)
            .context("Failed to open RocksDB database")?;

        Ok(Self { db })
    }

    /// Get a column family handle by name.
    fn get_cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .with_context(|| format!("Column family '{}' not found", name))
    }

    /// Take the next event id from the meta counter and advance it.
    fn next_event_id(&self) -> Result<u64> {
        let cf = self.get_cf("meta")?;
        let key = encode_meta_key(META_NEXT_EVENT_ID);
        let next = match self.db.get_cf(cf, &key).context("Failed to get event counter")? {
            Some(bytes) => {
                if bytes.len() != 8 {
                    anyhow::bail!("Event counter must be 8 bytes (u64), got {}", bytes.len());
                }
                u64::from_be_bytes(bytes.try_into().expect("8 bytes for u64"))
            }
            None => 0,
        };
        self.db
            .put_cf(cf, &key, (next + 1).to_be_bytes())
            .context("Failed to advance event counter")?;
        Ok(next)
    }
}

impl IndexStore for RocksIndexStore {
    fn ensure_schema(&self) -> Result<()> {
        // Column families are created at open; re-checking the handles
        // makes re-runs an idempotent no-op.
        for name in ["contracts", "transactions", "events", "meta"] {
            self.get_cf(name)?;
        }
        Ok(())
    }

    fn upsert_contract(&self, record: &ContractRecord) -> Result<()> {
        let cf = self.get_cf("contracts")?;
        let key = encode_contract_key(record.address);
        let value =
            postcard::to_allocvec(record).context("Failed to serialize contract record")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put contract")?;
        Ok(())
    }

    fn get_contract(&self, address: Address) -> Result<Option<ContractRecord>> {
        let cf = self.get_cf("contracts")?;
        let key = encode_contract_key(address);
        match self.db.get_cf(cf, &key).context("Failed to get contract")? {
            Some(bytes) => {
                let record = postcard::from_bytes(&bytes)
                    .context("Failed to deserialize contract record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn upsert_transaction(&self, record: &TransactionRecord) -> Result<()> {
        let cf = self.get_cf("transactions")?;
        let key = encode_transaction_key(record.hash);
        let value =
            postcard::to_allocvec(record).context("Failed to serialize transaction record")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put transaction")?;
        Ok(())
    }

    fn get_transaction(&self, hash: B256) -> Result<Option<TransactionRecord>> {
        let cf = self.get_cf("transactions")?;
        let key = encode_transaction_key(hash);
        match self.db.get_cf(cf, &key).context("Failed to get transaction")? {
            Some(bytes) => {
                let record = postcard::from_bytes(&bytes)
                    .context("Failed to deserialize transaction record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn insert_event(&self, record: &EventRecord) -> Result<u64> {
        let id = self.next_event_id()?;
        let cf = self.get_cf("events")?;
        let key = encode_event_key(id);
        let value = postcard::to_allocvec(record).context("Failed to serialize event record")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put event")?;
        Ok(id)
    }

    fn list_events(&self) -> Result<Vec<(u64, EventRecord)>> {
        let cf = self.get_cf("events")?;
        let mut events = Vec::new();
        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);

        for item in iter {
            let (key, value) = item.context("Failed to read iterator")?;
            let id = decode_event_key(&key).context("Failed to decode event key")?;
            let record: EventRecord =
                postcard::from_bytes(&value).context("Failed to deserialize event record")?;
            events.push((id, record));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AbiProvenance;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, RocksIndexStore) {
        let dir = TempDir::new().unwrap();
        let store = RocksIndexStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn contract(address: Address, verified: bool) -> ContractRecord {
        ContractRecord {
            address,
            code: vec![0x60, 0x80],
            abi: None,
            verified,
            provenance: if verified { AbiProvenance::Resolver } else { AbiProvenance::Rpc },
        }
    }

    #[test]
    fn test_ensure_schema_idempotent() {
        let (_dir, store) = open_store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
    }

    #[test]
    fn test_upsert_contract_overwrites() {
        let (_dir, store) = open_store();
        let addr = Address::repeat_byte(0x11);

        store.upsert_contract(&contract(addr, false)).unwrap();
        store.upsert_contract(&contract(addr, true)).unwrap();

        let stored = store.get_contract(addr).unwrap().unwrap();
        assert!(stored.verified);
        assert_eq!(stored.provenance, AbiProvenance::Resolver);
    }

    #[test]
    fn test_get_contract_missing() {
        let (_dir, store) = open_store();
        assert!(store.get_contract(Address::repeat_byte(0x99)).unwrap().is_none());
    }

    #[test]
    fn test_upsert_transaction_overwrites_decode_results() {
        let (_dir, store) = open_store();
        let hash = B256::repeat_byte(0xaa);

        let mut record = TransactionRecord {
            hash,
            block_number: 100,
            from: Address::repeat_byte(0x01),
            to: Some(Address::repeat_byte(0x02)),
            input: "0xa9059cbb".to_string(),
            decoded_function: None,
            decoded_args: None,
        };
        store.upsert_transaction(&record).unwrap();

        // Re-sync with an ABI now available overwrites the decode result.
        record.decoded_function = Some("transfer".to_string());
        record.decoded_args = Some(Default::default());
        store.upsert_transaction(&record).unwrap();

        let stored = store.get_transaction(hash).unwrap().unwrap();
        assert_eq!(stored.decoded_function.as_deref(), Some("transfer"));
    }

    #[test]
    fn test_insert_event_appends() {
        let (_dir, store) = open_store();
        let record = EventRecord {
            transaction_hash: Some(B256::repeat_byte(0xbb)),
            event_name: "Transfer".to_string(),
            decoded_fields: None,
        };

        let first = store.insert_event(&record).unwrap();
        let second = store.insert_event(&record).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);

        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 0);
        assert_eq!(events[1].0, 1);
        assert_eq!(events[0].1, events[1].1);
    }

    #[test]
    fn test_event_counter_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let record = EventRecord {
            transaction_hash: None,
            event_name: "unknown".to_string(),
            decoded_fields: None,
        };

        {
            let store = RocksIndexStore::open(dir.path()).unwrap();
            store.insert_event(&record).unwrap();
        }

        let store = RocksIndexStore::open(dir.path()).unwrap();
        let id = store.insert_event(&record).unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.list_events().unwrap().len(), 2);
    }
}
