//! An in-process devnet: a ledger of declared classes & deployed contracts that executes
//! signed transactions against the natively modeled contract classes.
//!
//! Every transaction is atomic. A transaction that fails during execution leaves the
//! ledger untouched apart from a `Reverted` receipt.

pub mod account;
pub mod transaction;

use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use contracts_common::{
    constants::{
        ACCOUNT_CONTRACT_NAME, EXECUTE_FN_NAME, GET_PUBLIC_KEY_FN_NAME, UDC_ADDRESS,
        UDC_CONTRACT_NAME,
    },
    encoding::{hex_to_felt, selector},
    types::Call,
};
use contracts_core::{
    contracts::{account::encode_execute_calldata, ClassRegistry},
    errors::ExecutionError,
    execution::{Event, ExecutionContext},
    state::State,
};
use serde::{Deserialize, Serialize};
use starknet::core::{
    chain_id,
    crypto::{ecdsa_verify, Signature},
    types::FieldElement,
};
use tracing::{debug, info};

use crate::{errors::ClientError, signer::MockSigner};

use self::{
    account::DevnetAccount,
    transaction::{
        declare_transaction_hash, invoke_transaction_hash, TransactionFields, TxReceipt, TxStatus,
    },
};

/// The classes declared at genesis
const GENESIS_CLASSES: [&str; 2] = [ACCOUNT_CONTRACT_NAME, UDC_CONTRACT_NAME];

/// Everything the devnet persists
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Ledger {
    /// The declared classes & deployed contracts
    state: State,
    /// The receipts of all executed transactions, by hash
    receipts: HashMap<FieldElement, TxReceipt>,
    /// The number of the latest block, one transaction per block
    block_number: u64,
}

impl Ledger {
    /// The ledger at genesis: accounts & the universal deployer are declared,
    /// and the universal deployer is deployed at its canonical address
    fn genesis(registry: &ClassRegistry) -> Result<Self, ClientError> {
        let mut state = State::default();
        for name in GENESIS_CLASSES {
            state.declare_class(registry.class_hash(name)?, name);
        }
        state.deploy_contract(
            hex_to_felt(UDC_ADDRESS)?,
            registry.class_hash(UDC_CONTRACT_NAME)?,
        )?;

        Ok(Self {
            state,
            ..Default::default()
        })
    }

    /// Executes a call against a scratch copy of the state
    fn call(
        &self,
        registry: &ClassRegistry,
        call: &Call,
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        let mut state = self.state.clone();
        let mut events = Vec::new();
        let mut ctx = ExecutionContext::new(&mut state, registry, &mut events);
        ctx.call_contract(call.to, call.selector, &call.calldata)
    }

    /// Applies a transaction, keeping its state changes only if it succeeds
    fn apply<F>(
        &mut self,
        registry: &ClassRegistry,
        transaction_hash: FieldElement,
        sender: FieldElement,
        execute: F,
    ) -> Result<(), ClientError>
    where
        F: FnOnce(&mut ExecutionContext) -> Result<(), ExecutionError>,
    {
        let snapshot = self.state.snapshot();
        self.block_number += 1;

        let mut events: Vec<Event> = Vec::new();
        let result = match self.state.increment_nonce(sender) {
            Ok(()) => {
                let mut ctx = ExecutionContext::new(&mut self.state, registry, &mut events);
                execute(&mut ctx)
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                debug!("Transaction {transaction_hash:#x} accepted in block {}", self.block_number);
                self.receipts.insert(
                    transaction_hash,
                    TxReceipt {
                        transaction_hash,
                        status: TxStatus::AcceptedOnL2,
                        events,
                        revert_reason: None,
                        block_number: self.block_number,
                    },
                );
                Ok(())
            },
            Err(e) => {
                debug!("Transaction {transaction_hash:#x} reverted: {e}");
                self.state.restore(&snapshot);
                self.receipts.insert(
                    transaction_hash,
                    TxReceipt {
                        transaction_hash,
                        status: TxStatus::Reverted,
                        events: Vec::new(),
                        revert_reason: Some(e.to_string()),
                        block_number: self.block_number,
                    },
                );
                Err(ClientError::Reverted {
                    transaction_hash,
                    source: e,
                })
            },
        }
    }
}

/// A copy of the whole devnet ledger, which can be restored or persisted as JSON
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DevnetSnapshot(Ledger);

/// A handle to an in-process devnet. Clones share the same ledger.
#[derive(Clone, Debug)]
pub struct Devnet {
    /// The ledger, shared between all handles & accounts
    ledger: Arc<Mutex<Ledger>>,
    /// The classes that can be declared
    registry: Arc<ClassRegistry>,
    /// The chain id transactions are signed for
    chain_id: FieldElement,
}

impl Devnet {
    /// Starts a devnet from genesis
    pub fn new() -> Result<Self, ClientError> {
        let registry = ClassRegistry::mystis()?;
        let ledger = Ledger::genesis(&registry)?;
        info!("Started devnet with {} genesis classes", GENESIS_CLASSES.len());

        Ok(Self::from_parts(ledger, registry))
    }

    /// Starts a devnet from a snapshot of another
    pub fn from_snapshot(snapshot: DevnetSnapshot) -> Result<Self, ClientError> {
        Ok(Self::from_parts(snapshot.0, ClassRegistry::mystis()?))
    }

    /// Wraps a ledger & a registry into a handle
    fn from_parts(ledger: Ledger, registry: ClassRegistry) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            registry: Arc::new(registry),
            chain_id: chain_id::TESTNET,
        }
    }

    /// Loads a devnet from a state file written by [`Devnet::dump`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ClientError::StateFile(format!("{}: {e}", path.display())))?;
        let snapshot: DevnetSnapshot =
            serde_json::from_str(&json).map_err(|e| ClientError::StateFile(e.to_string()))?;

        info!("Loaded devnet state from {}", path.display());
        Self::from_snapshot(snapshot)
    }

    /// Loads a devnet from a state file if it exists, otherwise starts one from genesis
    pub fn load_or_new<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::new()
        }
    }

    /// Writes the devnet state to a file
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<(), ClientError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot()?)
            .map_err(|e| ClientError::StateFile(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| ClientError::StateFile(format!("{}: {e}", path.display())))?;

        info!("Dumped devnet state to {}", path.display());
        Ok(())
    }

    /// Copies the current ledger
    pub fn snapshot(&self) -> Result<DevnetSnapshot, ClientError> {
        Ok(DevnetSnapshot(self.lock()?.clone()))
    }

    /// Rolls the ledger back to a snapshot
    pub fn restore(&self, snapshot: &DevnetSnapshot) -> Result<(), ClientError> {
        *self.lock()? = snapshot.0.clone();
        Ok(())
    }

    /// An independent devnet starting from the current ledger
    pub fn fork(&self) -> Result<Self, ClientError> {
        Ok(Self {
            ledger: Arc::new(Mutex::new(self.lock()?.clone())),
            registry: self.registry.clone(),
            chain_id: self.chain_id,
        })
    }

    /// Locks the ledger
    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, ClientError> {
        self.ledger.lock().map_err(|_| ClientError::StatePoisoned)
    }

    // -----------
    // | GETTERS |
    // -----------

    /// The chain id transactions are signed for
    pub fn chain_id(&self) -> FieldElement {
        self.chain_id
    }

    /// The classes that can be declared
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The hash of the class with the given name
    pub fn class_hash(&self, name: &str) -> Result<FieldElement, ClientError> {
        Ok(self.registry.class_hash(name)?)
    }

    /// Whether the class has been declared
    pub fn is_declared(&self, class_hash: FieldElement) -> Result<bool, ClientError> {
        Ok(self.lock()?.state.is_declared(class_hash))
    }

    /// The class of the contract deployed at the given address
    pub fn class_hash_at(&self, address: FieldElement) -> Result<FieldElement, ClientError> {
        Ok(self.lock()?.state.class_hash_at(address)?)
    }

    /// The nonce of the account at the given address
    pub fn nonce(&self, address: FieldElement) -> Result<u64, ClientError> {
        Ok(self.lock()?.state.nonce(address)?)
    }

    /// A storage slot of the contract at the given address
    pub fn storage_at(
        &self,
        address: FieldElement,
        key: FieldElement,
    ) -> Result<FieldElement, ClientError> {
        Ok(self.lock()?.state.storage_at(address, key)?)
    }

    /// The number of the latest block
    pub fn block_number(&self) -> Result<u64, ClientError> {
        Ok(self.lock()?.block_number)
    }

    /// The receipt of an executed transaction
    pub fn receipt(&self, transaction_hash: FieldElement) -> Result<TxReceipt, ClientError> {
        self.lock()?
            .receipts
            .get(&transaction_hash)
            .cloned()
            .ok_or(ClientError::TransactionNotFound(transaction_hash))
    }

    // ----------------
    // | TRANSACTIONS |
    // ----------------

    /// Deploys an account controlled by the given signer
    pub fn deploy_account(&self, signer: &MockSigner) -> Result<DevnetAccount, ClientError> {
        let mut ledger = self.lock()?;
        let class_hash = self.registry.class_hash(ACCOUNT_CONTRACT_NAME)?;
        // Salting with the number of contracts lets a signer control several accounts
        let salt = FieldElement::from(ledger.state.num_contracts());

        let mut events = Vec::new();
        let mut ctx = ExecutionContext::new(&mut ledger.state, &self.registry, &mut events);
        let address = ctx.deploy(
            class_hash,
            salt,
            &[signer.public_key()],
            FieldElement::ZERO,
        )?;

        info!("Deployed account at {address:#x}");
        Ok(DevnetAccount::new(self.clone(), address, signer.clone()))
    }

    /// Declares a class on behalf of an account, returning the transaction hash.
    ///
    /// Declaring an already declared class is accepted & leaves the class unchanged.
    pub fn declare(
        &self,
        sender: FieldElement,
        class_hash: FieldElement,
        max_fee: FieldElement,
        nonce: u64,
        signature: &Signature,
    ) -> Result<FieldElement, ClientError> {
        let name = self.registry.get(class_hash)?.name();

        let mut ledger = self.lock()?;
        let fields = self.transaction_fields(sender, max_fee, nonce);
        let transaction_hash = declare_transaction_hash(fields, class_hash)?;
        self.validate(&ledger, fields, transaction_hash, signature)?;

        ledger.apply(&self.registry, transaction_hash, sender, |ctx| {
            if ctx.is_declared(class_hash) {
                debug!("Class {name} already declared");
            }
            Ok(())
        })?;
        ledger.state.declare_class(class_hash, name);

        info!("Declared {name} with class hash {class_hash:#x}");
        Ok(transaction_hash)
    }

    /// Executes a multicall on behalf of an account, returning the transaction hash
    pub fn invoke(
        &self,
        sender: FieldElement,
        calls: &[Call],
        max_fee: FieldElement,
        nonce: u64,
        signature: &Signature,
    ) -> Result<FieldElement, ClientError> {
        let mut ledger = self.lock()?;
        let fields = self.transaction_fields(sender, max_fee, nonce);
        let transaction_hash = invoke_transaction_hash(fields, calls)?;
        self.validate(&ledger, fields, transaction_hash, signature)?;

        let execute = selector(EXECUTE_FN_NAME)?;
        let calldata = encode_execute_calldata(calls);
        ledger.apply(&self.registry, transaction_hash, sender, |ctx| {
            ctx.call_contract(sender, execute, &calldata).map(|_| ())
        })?;

        Ok(transaction_hash)
    }

    /// Calls a view function. The ledger is never modified.
    pub fn call(&self, call: &Call) -> Result<Vec<FieldElement>, ClientError> {
        Ok(self.lock()?.call(&self.registry, call)?)
    }

    /// The fields a transaction from the given sender is hashed over
    pub(crate) fn transaction_fields(
        &self,
        sender: FieldElement,
        max_fee: FieldElement,
        nonce: u64,
    ) -> TransactionFields {
        TransactionFields {
            sender,
            max_fee,
            chain_id: self.chain_id,
            nonce,
        }
    }

    /// Checks a transaction's nonce & signature against the sending account
    fn validate(
        &self,
        ledger: &Ledger,
        fields: TransactionFields,
        transaction_hash: FieldElement,
        signature: &Signature,
    ) -> Result<(), ClientError> {
        let expected = ledger.state.nonce(fields.sender)?;
        if fields.nonce != expected {
            return Err(ExecutionError::InvalidNonce {
                expected,
                actual: fields.nonce,
            }
            .into());
        }

        let get_public_key = Call {
            to: fields.sender,
            selector: selector(GET_PUBLIC_KEY_FN_NAME)?,
            calldata: Vec::new(),
        };
        let retdata = ledger.call(&self.registry, &get_public_key)?;
        let public_key = public_key_from_retdata(fields.sender, &retdata)?;

        let valid = ecdsa_verify(&public_key, &transaction_hash, signature)
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        if !valid {
            return Err(ExecutionError::InvalidSignature {
                account: fields.sender,
            }
            .into());
        }

        Ok(())
    }
}

/// Reads the public key out of an account's `getPublicKey` return data
fn public_key_from_retdata(
    account: FieldElement,
    retdata: &[FieldElement],
) -> Result<FieldElement, ClientError> {
    match retdata {
        [public_key] => Ok(*public_key),
        _ => Err(ClientError::MissingPublicKey(account)),
    }
}
