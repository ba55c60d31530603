use crate::observe;

/// Hands out nonces for one sender over the course of a run.
///
/// The node's pending transaction count is queried before every
/// transaction. Should the node lag behind what was already sent, the
/// allocator continues after the last nonce it handed out instead of
/// reissuing it.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    last: Option<u64>,
}

impl NonceAllocator {
    /// Returns the nonce to use given the node's pending transaction count.
    pub fn allocate(&mut self, pending: u64) -> u64 {
        let nonce = match self.last {
            Some(last) if pending <= last => {
                observe::stale_transaction_count(pending, last);
                last + 1
            }
            _ => pending,
        };
        self.last = Some(nonce);
        nonce
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<u64> {
        self.last
    }
}
