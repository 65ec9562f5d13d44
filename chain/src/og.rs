//! Early-holder ("OG") check.
//!
//! Scans historical `Transfer` events into a wallet for one designated
//! collection and reports whether any transfer landed strictly before a
//! fixed cutoff instant. This is an advisory badge signal, independent of
//! vote-weight resolution, and callers run it separately so a long scan
//! never blocks a vote.
//!
//! The scan pages through block ranges and awaits between pages, so it is
//! cancelled by dropping the future. Nothing is cached: only pre-cutoff
//! history is consulted, which is assumed final.

use crate::reader::ChainReader;
use crate::ChainError;
use tracing::debug;
use vouch_types::{Address, Timestamp};

/// Default number of blocks fetched per `eth_getLogs` page.
pub const DEFAULT_PAGE_BLOCKS: u64 = 100_000;

/// Whether `wallet` received a token of `contract` strictly before `cutoff`.
pub async fn check_early_holder(
    reader: &dyn ChainReader,
    contract: &Address,
    wallet: &Address,
    cutoff: Timestamp,
    page_blocks: u64,
) -> Result<bool, ChainError> {
    let page_blocks = page_blocks.max(1);
    let latest = reader.latest_block().await?;
    let mut from = 0u64;

    while from <= latest {
        // Once the page's first block is already at or past the cutoff, no
        // later event can qualify — stop scanning.
        if reader.block_timestamp(from).await? >= cutoff {
            debug!(wallet = %wallet, from, "early-holder scan passed cutoff, stopping");
            return Ok(false);
        }

        let to = from.saturating_add(page_blocks - 1).min(latest);
        let events = reader.transfer_events_to(contract, wallet, from, to).await?;
        for event in events {
            let block_time = reader.block_timestamp(event.block_number).await?;
            if block_time < cutoff {
                debug!(
                    wallet = %wallet,
                    block = event.block_number,
                    "found pre-cutoff transfer"
                );
                return Ok(true);
            }
        }

        from = to + 1;
    }

    Ok(false)
}
