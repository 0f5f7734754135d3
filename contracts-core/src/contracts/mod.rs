//! Native models of the contract classes, and the registry they are declared from

pub mod account;
pub mod components;
pub mod nft;
pub mod proxy;
pub mod udc;

use std::{collections::HashMap, fmt, sync::Arc};

use contracts_common::{
    abi::{function_selector, ContractAbi},
    calldata::CalldataReader,
    encoding::str_to_felt,
};
use starknet::core::{crypto::compute_hash_on_elements, types::FieldElement};

use crate::{errors::ExecutionError, execution::ExecutionContext};

use self::{account::Account, nft::MystisNft, proxy::MystisProxy, udc::UniversalDeployer};

/// A contract class: an ABI & the entry points behind it
pub trait ContractClass: Send + Sync + fmt::Debug {
    /// The name of the class, which is also the name of its compiled artifact
    fn name(&self) -> &'static str;

    /// The ABI of the class
    fn abi(&self) -> &ContractAbi;

    /// Runs the constructor. Classes without a constructor accept no calldata.
    fn constructor(
        &self,
        _ctx: &mut ExecutionContext,
        calldata: &[FieldElement],
    ) -> Result<(), ExecutionError> {
        CalldataReader::new(calldata).finish()?;
        Ok(())
    }

    /// Executes the entry point with the given selector
    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError>;

    /// Resolves a selector to the name of one of the class's functions
    fn entry_point_name(&self, selector: FieldElement) -> Result<&str, ExecutionError> {
        self.abi()
            .function_by_selector(selector)
            .map(|function| function.name.as_str())
            .ok_or(ExecutionError::EntryPointNotFound { selector })
    }
}

/// The class hash of a contract class, derived from its name & external selectors
pub fn compute_class_hash(class: &dyn ContractClass) -> Result<FieldElement, ExecutionError> {
    let mut elements = vec![str_to_felt(class.name())?];
    for function in class.abi().functions() {
        elements.push(function_selector(function)?);
    }

    Ok(compute_hash_on_elements(&elements))
}

/// The contract classes known to a network, keyed by class hash
#[derive(Clone, Default)]
pub struct ClassRegistry {
    /// The classes, keyed by class hash
    classes: HashMap<FieldElement, Arc<dyn ContractClass>>,
    /// The class hashes, keyed by class name
    hashes_by_name: HashMap<&'static str, FieldElement>,
}

impl ClassRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every Mystis contract class
    pub fn mystis() -> Result<Self, ExecutionError> {
        let mut registry = Self::new();
        registry.register(Arc::new(Account::new()))?;
        registry.register(Arc::new(UniversalDeployer::new()))?;
        registry.register(Arc::new(MystisProxy::new()))?;
        registry.register(Arc::new(MystisNft::v1()))?;
        registry.register(Arc::new(MystisNft::v2()))?;
        Ok(registry)
    }

    /// Registers a class, returning its class hash
    pub fn register(
        &mut self,
        class: Arc<dyn ContractClass>,
    ) -> Result<FieldElement, ExecutionError> {
        let hash = compute_class_hash(class.as_ref())?;
        self.hashes_by_name.insert(class.name(), hash);
        self.classes.insert(hash, class);
        Ok(hash)
    }

    /// The class registered under the given hash
    pub fn get(&self, class_hash: FieldElement) -> Result<&dyn ContractClass, ExecutionError> {
        self.classes
            .get(&class_hash)
            .map(|class| class.as_ref())
            .ok_or(ExecutionError::ClassNotDeclared { class_hash })
    }

    /// The class registered under the given name
    pub fn get_by_name(&self, name: &str) -> Result<&dyn ContractClass, ExecutionError> {
        self.get(self.class_hash(name)?)
    }

    /// The hash of the class registered under the given name
    pub fn class_hash(&self, name: &str) -> Result<FieldElement, ExecutionError> {
        self.hashes_by_name
            .get(name)
            .copied()
            .ok_or_else(|| ExecutionError::UnknownClass(name.to_string()))
    }

    /// The names of the registered classes
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hashes_by_name.keys().copied()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.hashes_by_name.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use contracts_common::constants::{
        ACCOUNT_CONTRACT_NAME, MYSTIS_NFT_CONTRACT_NAME, MYSTIS_NFT_V2_CONTRACT_NAME,
        MYSTIS_PROXY_CONTRACT_NAME, UDC_CONTRACT_NAME,
    };
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_registry_holds_distinct_classes() {
        let registry = ClassRegistry::mystis().unwrap();
        let names = [
            ACCOUNT_CONTRACT_NAME,
            UDC_CONTRACT_NAME,
            MYSTIS_PROXY_CONTRACT_NAME,
            MYSTIS_NFT_CONTRACT_NAME,
            MYSTIS_NFT_V2_CONTRACT_NAME,
        ];

        let hashes: HashSet<FieldElement> = names
            .iter()
            .map(|name| registry.class_hash(name).unwrap())
            .collect();
        assert_eq!(hashes.len(), names.len());

        let nft = registry.get_by_name(MYSTIS_NFT_CONTRACT_NAME).unwrap();
        assert_eq!(nft.name(), MYSTIS_NFT_CONTRACT_NAME);
    }

    #[test]
    fn test_unknown_class() {
        let registry = ClassRegistry::mystis().unwrap();
        assert_eq!(
            registry.class_hash("ERC20"),
            Err(ExecutionError::UnknownClass("ERC20".to_string()))
        );
    }

    #[test]
    fn test_entry_point_name_rejects_unknown_selectors() {
        let registry = ClassRegistry::mystis().unwrap();
        let nft = registry.get_by_name(MYSTIS_NFT_CONTRACT_NAME).unwrap();

        assert_eq!(
            nft.entry_point_name(FieldElement::ONE),
            Err(ExecutionError::EntryPointNotFound {
                selector: FieldElement::ONE
            })
        );
    }
}
