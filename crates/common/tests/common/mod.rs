//! Shared test utilities for audit and secret sharing integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;

use common::crypto::pdp::StoredSegment;
use common::crypto::{compute_tag, generate_keypair, PairingParams, PrivateKey, PublicKey, TagParams};
use common::curves::Fr;

/// One data owner's view of a file: keys plus the per-file `V` and `U`
pub struct Owner {
    pub params: PairingParams,
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
    pub random_v: Fr,
    pub random_u: Fr,
}

/// Route library logs to the test harness; set `RUST_LOG` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up an owner with a fresh keypair and random `V`/`U`
pub fn setup_owner() -> Owner {
    init_tracing();
    let params = PairingParams::new();
    let (private_key, public_key) = generate_keypair(&params).unwrap();
    let random_v = params.random_within_order().unwrap();
    let random_u = params.random_within_order().unwrap();
    Owner {
        params,
        private_key,
        public_key,
        random_v,
        random_u,
    }
}

/// Tag `contents` as segments `1..=n` for `round`, the way an owner would
/// before handing them to a holder
pub fn tag_segments(owner: &Owner, contents: &[&[u8]], round: u64) -> BTreeMap<u64, StoredSegment> {
    contents
        .iter()
        .enumerate()
        .map(|(i, &content)| {
            let index = i as u64 + 1;
            let tag = compute_tag(
                &owner.params,
                &TagParams {
                    content,
                    index,
                    random_v: owner.random_v,
                    random_u: owner.random_u,
                    private_key: owner.private_key.clone(),
                    round,
                },
            )
            .unwrap();
            (
                index,
                StoredSegment {
                    tag,
                    content: content.to_vec(),
                },
            )
        })
        .collect()
}
