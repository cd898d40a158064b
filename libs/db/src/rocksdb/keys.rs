//! Lazy, batched key iteration.

use rocksdb::{DBIteratorWithThreadMode, IteratorMode, DB};

use super::codec::decode_key;
use crate::error::Result;

/// Iterator over all keys of a store in fixed-size batches.
///
/// Produced by [`Store::iter_keys`](super::Store::iter_keys). Keys come in
/// RocksDB order (byte-wise ascending). Every batch except possibly the last
/// holds exactly `batch_size` keys; an empty database yields no batches.
/// After an engine error the iterator yields that error once and then ends.
pub struct KeyBatches<'a> {
    inner: DBIteratorWithThreadMode<'a, DB>,
    batch_size: usize,
    done: bool,
}

impl<'a> KeyBatches<'a> {
    pub(crate) fn new(db: &'a DB, batch_size: usize) -> Self {
        Self {
            inner: db.iterator(IteratorMode::Start),
            batch_size: batch_size.max(1),
            done: false,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Iterator for KeyBatches<'_> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.inner.next() {
                Some(Ok((key, _value))) => match decode_key(&key) {
                    Ok(key) => batch.push(key),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

impl std::iter::FusedIterator for KeyBatches<'_> {}
