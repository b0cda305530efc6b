//! # Stake Kernel Scenarios
//!
//! Stake claims checked against a chain that has already switched to PoS.
//!
//! A rejection is only permanent when the node knows enough chain context to
//! be sure of it. With the parent missing the same stake problems come back
//! transient and carry no ban weight, so an honest peer relaying a block
//! ahead of its parent is never penalized.

#[cfg(test)]
mod tests {
    use crate::fixture::{StakeTestChain, ACTIVATION_HEIGHT, TREASURY};
    use rayon::prelude::*;
    use shared_types::{OutPoint, Transaction, TxIn, TxOut, ZERO_HASH};
    use stake_consensus::adapters::test_helpers::signing_key;
    use stake_consensus::{
        BlockDisposition, BlockRejectedEvent, ConsensusEvent, RejectReason, StakeConsensusApi,
        UtxoView, ValidationOutcome,
    };

    fn assert_rejected(outcome: ValidationOutcome, reason: RejectReason, transient: bool) {
        assert_eq!(outcome.reject_reason(), Some(reason));
        assert_eq!(outcome.is_transient(), transient, "{reason}");
        assert_eq!(outcome.is_invalid(), !transient, "{reason}");
        assert_eq!(outcome.ban_weight(), if transient { 0 } else { 100 });
    }

    fn random_outpoint() -> OutPoint {
        OutPoint::new(rand::random(), 0)
    }

    #[test]
    fn test_valid_stake_claim() {
        let fixture = StakeTestChain::activated();
        let stake = fixture.mature_stake().unwrap();
        let block = fixture.build_pos_block(stake);

        assert_eq!(
            fixture.service.check_proof_of_stake(&block),
            ValidationOutcome::Valid
        );
        assert!(fixture.service.check_block_validity(&block).is_valid());
    }

    #[test]
    fn test_unknown_stake_with_known_parent() {
        let fixture = StakeTestChain::activated();
        let block = fixture.build_pos_block(random_outpoint());
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::UnknownStake,
            false,
        );
    }

    #[test]
    fn test_unknown_stake_with_unknown_parent() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(random_outpoint());
        block.header.parent_hash = rand::random();
        fixture.reseal(&mut block);

        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::TmpUnknownStake,
            true,
        );
    }

    #[test]
    fn test_random_stake_never_bans_without_parent() {
        let fixture = StakeTestChain::activated();
        for _ in 0..50 {
            let mut block = fixture.build_pos_block(random_outpoint());
            block.header.parent_hash = rand::random();
            fixture.reseal(&mut block);

            let outcome = fixture.service.check_block_consensus(&block);
            assert!(outcome.is_transient(), "{outcome:?}");
            assert_eq!(outcome.ban_weight(), 0);
        }
    }

    #[test]
    fn test_stake_in_mempool() {
        let fixture = StakeTestChain::activated();
        let funding = fixture.mature_stake().unwrap();
        let pending = Transaction {
            version: 1,
            inputs: vec![TxIn { prevout: funding }],
            outputs: vec![TxOut {
                value: 50,
                owner: fixture.owner(),
            }],
            lock_time: 0,
        };
        fixture.mempool.insert(pending.txid());

        let mut block = fixture.build_pos_block(OutPoint::new(pending.txid(), 0));
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::StakeInMempool,
            false,
        );

        block.header.parent_hash = rand::random();
        fixture.reseal(&mut block);
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::TmpStakeInMempool,
            true,
        );
    }

    #[test]
    fn test_good_stake_with_missing_parent() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        block.header.parent_hash = ZERO_HASH;
        fixture.reseal(&mut block);

        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::BadPrevHeader,
            true,
        );
    }

    #[test]
    fn test_stake_on_pow_era_parent() {
        let fixture = StakeTestChain::activated();
        let stake = fixture.mature_stake().unwrap();

        for parent_height in [0, 50, 101] {
            let mut block = fixture.build_pos_block(stake);
            block.header.parent_hash = fixture.block_at(parent_height).hash();
            fixture.reseal(&mut block);

            assert_rejected(
                fixture.service.check_proof_of_stake(&block),
                RejectReason::StakeAfterFork,
                false,
            );
        }
    }

    #[test]
    fn test_coinbase_maturity_edge() {
        let fixture = StakeTestChain::activated();
        let tip = fixture.height();

        let mature = fixture.coinbase_output(tip - 100);
        assert!(fixture.utxos.unspent_output(&mature).is_some());
        let block = fixture.build_pos_block(mature);
        assert!(fixture.service.check_proof_of_stake(&block).is_valid());

        let young = fixture.coinbase_output(tip - 100 + 1);
        let block = fixture.build_pos_block(young);
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::StakeCoinbaseMaturity,
            false,
        );
    }

    #[test]
    fn test_restaking_returned_stake_too_early() {
        let fixture = StakeTestChain::activated();
        let returned = fixture.coinbase_output(fixture.height());
        let block = fixture.build_pos_block(returned);
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::StakeCoinbaseMaturity,
            false,
        );
    }

    #[test]
    fn test_stake_already_spent() {
        let fixture = StakeTestChain::activated();
        let spent = fixture.tip().header.stake_reference.unwrap();
        let block = fixture.build_pos_block(spent);
        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::UnknownStake,
            false,
        );
    }

    #[test]
    fn test_signature_by_other_key() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        fixture.reseal_with(&mut block, &signing_key(99));

        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::StakeSignature,
            false,
        );
    }

    #[test]
    fn test_signature_over_other_header() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        block.header.timestamp += 1;

        assert_rejected(
            fixture.service.check_proof_of_stake(&block),
            RejectReason::StakeSignature,
            false,
        );
    }

    #[test]
    fn test_missing_coinbase_passes_kernel_only() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        block.transactions.clear();

        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::MerkleRootMismatch,
            false,
        );

        fixture.reseal(&mut block);
        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::CoinbaseMissing,
            false,
        );
    }

    #[test]
    fn test_dropped_transaction_breaks_merkle_root() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        block.transactions.push(Transaction {
            version: 1,
            inputs: vec![TxIn {
                prevout: fixture.coinbase_output(fixture.height() - 100),
            }],
            outputs: vec![TxOut {
                value: 49,
                owner: TREASURY,
            }],
            lock_time: 0,
        });
        fixture.reseal(&mut block);
        assert!(fixture.service.check_block_validity(&block).is_valid());

        block.transactions.remove(1);
        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::MerkleRootMismatch,
            false,
        );
    }

    #[test]
    fn test_inflated_treasury_output_breaks_merkle_root() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        block.transactions[0].outputs[1].value = 1_000_000;

        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::MerkleRootMismatch,
            false,
        );
    }

    #[test]
    fn test_tampered_coinbase_passes_kernel_only() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());

        let coinbase = &mut block.transactions[0];
        let staker = coinbase.outputs[0].owner;
        coinbase.outputs[0].owner = coinbase.outputs[1].owner;
        coinbase.outputs[1].owner = staker;

        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert!(fixture.service.check_block_consensus(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::MerkleRootMismatch,
            false,
        );

        // Committed and signed by the staker, still paying the wrong owner.
        fixture.reseal(&mut block);
        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::CoinbaseStakePayout,
            false,
        );
    }

    #[test]
    fn test_coinbase_underpays_stake() {
        let fixture = StakeTestChain::activated();
        let stake = fixture.mature_stake().unwrap();
        let staked = fixture.utxos.unspent_output(&stake).unwrap().value;

        let mut block = fixture.build_pos_block(stake);
        block.transactions[0].outputs[0].value = staked - 1;
        fixture.reseal(&mut block);

        assert!(fixture.service.check_proof_of_stake(&block).is_valid());
        assert_rejected(
            fixture.service.check_block_validity(&block),
            RejectReason::CoinbaseStakePayout,
            false,
        );
    }

    #[test]
    fn test_checks_are_idempotent() {
        let fixture = StakeTestChain::activated();
        let blocks = [
            fixture.build_pos_block(fixture.mature_stake().unwrap()),
            fixture.build_pos_block(random_outpoint()),
            fixture.build_pos_block(fixture.coinbase_output(fixture.height())),
            fixture.build_pow_block(),
        ];

        let first: Vec<_> = blocks
            .iter()
            .map(|b| fixture.service.check_block_validity(b))
            .collect();
        let second: Vec<_> = blocks
            .iter()
            .map(|b| fixture.service.check_block_validity(b))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_checks_agree() {
        let fixture = StakeTestChain::activated();
        let valid = fixture.build_pos_block(fixture.mature_stake().unwrap());
        let unknown = fixture.build_pos_block(random_outpoint());

        let outcomes: Vec<_> = (0..64)
            .into_par_iter()
            .map(|i| {
                let block = if i % 2 == 0 { &valid } else { &unknown };
                fixture.service.check_proof_of_stake(block)
            })
            .collect();

        for (i, outcome) in outcomes.iter().enumerate() {
            if i % 2 == 0 {
                assert!(outcome.is_valid());
            } else {
                assert_eq!(outcome.reject_reason(), Some(RejectReason::UnknownStake));
            }
        }
    }

    #[tokio::test]
    async fn test_process_block_requeues_orphan_stake() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(random_outpoint());
        block.header.parent_hash = rand::random();
        fixture.reseal(&mut block);

        let disposition = fixture
            .service
            .process_block(&block, Some([0xAB; 32]))
            .await
            .unwrap();
        assert_eq!(
            disposition,
            BlockDisposition::Requeue(RejectReason::TmpUnknownStake)
        );
        // Only the activation announcement; no penalty.
        assert_eq!(
            fixture.event_bus.get_events(),
            vec![ConsensusEvent::ActivationLatched {
                height: ACTIVATION_HEIGHT
            }]
        );
    }

    #[tokio::test]
    async fn test_process_block_penalizes_forged_stake() {
        let fixture = StakeTestChain::activated();
        let mut block = fixture.build_pos_block(fixture.mature_stake().unwrap());
        fixture.reseal_with(&mut block, &signing_key(99));
        let peer = [0xCD; 32];

        let disposition = fixture
            .service
            .process_block(&block, Some(peer))
            .await
            .unwrap();
        assert_eq!(
            disposition,
            BlockDisposition::Reject {
                reason: RejectReason::StakeSignature,
                ban_weight: 100,
            }
        );
        assert_eq!(
            fixture.event_bus.get_events(),
            vec![
                ConsensusEvent::ActivationLatched {
                    height: ACTIVATION_HEIGHT
                },
                ConsensusEvent::BlockRejected(BlockRejectedEvent {
                    block_hash: block.hash(),
                    reason: RejectReason::StakeSignature,
                    ban_weight: 100,
                    source_peer: Some(peer),
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_process_block_accepts_and_connects() {
        let mut fixture = StakeTestChain::activated();
        let block = fixture.build_pos_block(fixture.mature_stake().unwrap());

        let disposition = fixture.service.process_block(&block, None).await.unwrap();
        assert_eq!(disposition, BlockDisposition::Accept);
        fixture.connect(block);
        assert_eq!(fixture.height(), 133);
    }
}
