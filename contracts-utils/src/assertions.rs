//! Assertions over transaction outcomes, for use in tests

use std::fmt::Debug;

use starknet::core::types::FieldElement;

use crate::{devnet::transaction::TxReceipt, errors::ClientError};

/// Asserts that the result is a failure whose message contains `reverted_with`
pub fn assert_revert<T: Debug>(result: Result<T, ClientError>, reverted_with: &str) {
    match result {
        Ok(value) => panic!("expected revert with `{reverted_with}`, got {value:?}"),
        Err(e) => assert!(
            e.to_string().contains(reverted_with),
            "expected revert with `{reverted_with}`, got `{e}`"
        ),
    }
}

/// Asserts that the result failed because the selector is exposed by no entry point
pub fn assert_revert_entry_point<T: Debug>(result: Result<T, ClientError>, selector: FieldElement) {
    assert_revert(result, &format!("Entry point {selector:#x} not found in contract"));
}

/// The number of events with the given name & data emitted by the given contract
pub fn count_events(
    receipt: &TxReceipt,
    from_address: FieldElement,
    name: &str,
    data: &[FieldElement],
) -> usize {
    receipt
        .events_named(from_address, name)
        .filter(|event| event.data == data)
        .count()
}

/// Asserts that the contract emitted the named event with the given data
pub fn assert_event_emitted(
    receipt: &TxReceipt,
    from_address: FieldElement,
    name: &str,
    data: &[FieldElement],
) {
    assert!(
        count_events(receipt, from_address, name, data) > 0,
        "event {name}{data:?} not emitted by {from_address:#x}"
    );
}
