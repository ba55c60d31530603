use {
    crate::{
        Error,
        chain::{Chain, Receipt},
        observe,
    },
    alloy::primitives::B256,
    std::time::Duration,
    tokio::time::Instant,
    tokio_util::sync::CancellationToken,
};

/// Floor for the delay between two receipt queries.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to wait for a transaction receipt.
#[derive(Debug, Clone, Copy)]
pub struct Polling {
    /// Delay before the second receipt query. Doubles after every query.
    pub interval: Duration,
    /// Upper bound for the delay between two queries.
    pub max_interval: Duration,
    /// Total time to wait for the receipt.
    pub timeout: Duration,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Polls the node until the receipt of `hash` is available.
///
/// Fails with [`Error::ConfirmationTimeout`] once `polling.timeout` elapsed
/// and with [`Error::Cancelled`] as soon as `cancel` is triggered. Delays
/// between queries never drop below [`MIN_POLL_INTERVAL`] and never exceed
/// `polling.max_interval`.
pub async fn await_receipt(
    chain: &dyn Chain,
    hash: B256,
    polling: &Polling,
    cancel: &CancellationToken,
) -> Result<Receipt, Error> {
    let deadline = Instant::now() + polling.timeout;
    let timeout = || Error::ConfirmationTimeout {
        hash,
        timeout: polling.timeout,
    };
    let max_interval = polling.max_interval.max(MIN_POLL_INTERVAL);
    let mut interval = polling.interval.clamp(MIN_POLL_INTERVAL, max_interval);
    loop {
        let receipt = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep_until(deadline) => return Err(timeout()),
            receipt = chain.transaction_receipt(hash) => receipt,
        };
        if let Some(receipt) = receipt.map_err(|err| Error::rpc("receipt query", err))? {
            return Ok(receipt);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timeout());
        }
        let delay = interval.min(remaining);
        observe::awaiting_receipt(hash, delay);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        interval = interval.saturating_mul(2).min(max_interval);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::chain::MockChain,
        std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    fn receipt(hash: B256) -> Receipt {
        Receipt {
            transaction_hash: hash,
            success: true,
            contract_address: None,
            block_number: Some(1),
            gas_used: 21_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_until_receipt_is_available() {
        let hash = B256::repeat_byte(1);
        let queries = Arc::new(AtomicUsize::new(0));
        let mut chain = MockChain::new();
        chain.expect_transaction_receipt().returning({
            let queries = queries.clone();
            move |hash| {
                let n = queries.fetch_add(1, Ordering::SeqCst);
                Ok((n == 4).then(|| receipt(hash)))
            }
        });
        let polling = Polling {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(4),
            timeout: Duration::from_secs(60),
        };

        let start = Instant::now();
        let result = await_receipt(&chain, hash, &polling, &CancellationToken::new()).await;

        assert_eq!(result.unwrap(), receipt(hash));
        assert_eq!(queries.load(Ordering::SeqCst), 5);
        // 1s + 2s + 4s + 4s between the five queries.
        assert_eq!(start.elapsed(), Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn first_delay_is_capped_by_max_interval() {
        let hash = B256::repeat_byte(2);
        let mut seq = mockall::Sequence::new();
        let mut chain = MockChain::new();
        chain
            .expect_transaction_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        chain
            .expect_transaction_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(Some(receipt(hash))));
        let polling = Polling {
            interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        };

        let start = Instant::now();
        let result = await_receipt(&chain, hash, &polling, &CancellationToken::new()).await;

        assert_eq!(result.unwrap(), receipt(hash));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_intervals_do_not_spin() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut chain = MockChain::new();
        chain.expect_transaction_receipt().returning({
            let queries = queries.clone();
            move |_| {
                queries.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        });
        let polling = Polling {
            interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            timeout: Duration::from_millis(200),
        };

        let start = Instant::now();
        let result =
            await_receipt(&chain, B256::ZERO, &polling, &CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::ConfirmationTimeout { .. })));
        assert_eq!(start.elapsed(), polling.timeout);
        // One query every 10ms.
        assert!(queries.load(Ordering::SeqCst) <= 21);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out() {
        let mut chain = MockChain::new();
        chain.expect_transaction_receipt().returning(|_| Ok(None));
        let polling = Polling {
            timeout: Duration::from_secs(30),
            ..Default::default()
        };

        let start = Instant::now();
        let result =
            await_receipt(&chain, B256::ZERO, &polling, &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::ConfirmationTimeout { timeout, .. }) if timeout == polling.timeout
        ));
        assert_eq!(start.elapsed(), polling.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn honours_cancellation() {
        let mut chain = MockChain::new();
        chain.expect_transaction_receipt().returning(|_| Ok(None));
        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                cancel.cancel();
            }
        });

        let start = Instant::now();
        let result = await_receipt(&chain, B256::ZERO, &Polling::default(), &cancel).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn node_errors_abort_waiting() {
        let mut chain = MockChain::new();
        chain
            .expect_transaction_receipt()
            .times(1)
            .returning(|_| Err(ethrpc::alloy::errors::testing_connection_error()));

        let result = await_receipt(
            &chain,
            B256::ZERO,
            &Polling::default(),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(Error::Connection(_))));
    }
}
