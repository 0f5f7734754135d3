//! Cairo 0 contract ABIs, as emitted next to compiled contracts
//! (e.g. `artifacts/abis/MystisNFT.json`)
//!
//! The ABI is what a contract handle is bound to: it decides which function names
//! can be called or invoked, and is how the proxy handle is "rebound" to the
//! implementation's interface after deployment. Entries are `starknet`'s own
//! legacy ABI types, so artifacts parse the same way the provider parses them.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use starknet::core::{
    types::{
        contract::legacy::{
            RawLegacyAbiEntry, RawLegacyConstructor, RawLegacyEvent, RawLegacyFunction,
            RawLegacyMember, RawLegacyStruct,
        },
        FieldElement, FunctionStateMutability, LegacyTypedParameter,
    },
    utils::get_selector_from_name,
};

use crate::errors::EncodingError;

/// The Cairo type name of a field element
pub const FELT_TYPE: &str = "felt";
/// The Cairo type name of a pointer to field elements, i.e. an array
pub const FELT_ARRAY_TYPE: &str = "felt*";
/// The Cairo type name of a 256-bit unsigned integer struct
pub const UINT256_TYPE: &str = "Uint256";

/// The selector of an ABI function
pub fn function_selector(function: &RawLegacyFunction) -> Result<FieldElement, EncodingError> {
    get_selector_from_name(&function.name)
        .map_err(|_| EncodingError::NonAscii(function.name.clone()))
}

/// A contract's ABI
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAbi {
    /// The ABI entries, in declaration order
    entries: Vec<RawLegacyAbiEntry>,
}

impl ContractAbi {
    /// Creates an empty ABI
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an ABI from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self, EncodingError> {
        serde_json::from_str(json).map_err(|e| EncodingError::Abi(e.to_string()))
    }

    /// Loads an ABI from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EncodingError> {
        let json = fs::read_to_string(path.as_ref())
            .map_err(|e| EncodingError::Abi(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json_str(&json)
    }

    /// Serializes the ABI to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, EncodingError> {
        serde_json::to_string_pretty(self).map_err(|e| EncodingError::Abi(e.to_string()))
    }

    /// The ABI entries
    pub fn entries(&self) -> &[RawLegacyAbiEntry] {
        &self.entries
    }

    /// The external & view functions
    pub fn functions(&self) -> impl Iterator<Item = &RawLegacyFunction> {
        self.entries.iter().filter_map(|entry| match entry {
            RawLegacyAbiEntry::Function(function) => Some(function),
            _ => None,
        })
    }

    /// Looks up a function by name
    pub fn function(&self, name: &str) -> Option<&RawLegacyFunction> {
        self.functions().find(|function| function.name == name)
    }

    /// Looks up a function by selector
    pub fn function_by_selector(&self, selector: FieldElement) -> Option<&RawLegacyFunction> {
        self.functions()
            .find(|function| function_selector(function).is_ok_and(|s| s == selector))
    }

    /// Looks up an event by name
    pub fn event(&self, name: &str) -> Option<&RawLegacyEvent> {
        self.entries.iter().find_map(|entry| match entry {
            RawLegacyAbiEntry::Event(event) if event.name == name => Some(event),
            _ => None,
        })
    }

    /// The constructor, if the contract declares one
    pub fn constructor(&self) -> Option<&RawLegacyConstructor> {
        self.entries.iter().find_map(|entry| match entry {
            RawLegacyAbiEntry::Constructor(constructor) => Some(constructor),
            _ => None,
        })
    }

    // -----------
    // | BUILDER |
    // -----------

    /// Appends an external function
    pub fn with_external(
        self,
        name: &str,
        inputs: &[(&str, &str)],
        outputs: &[(&str, &str)],
    ) -> Self {
        self.with_function(name, inputs, outputs, None)
    }

    /// Appends a view function
    pub fn with_view(self, name: &str, inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> Self {
        self.with_function(name, inputs, outputs, Some(FunctionStateMutability::View))
    }

    /// Appends the constructor
    pub fn with_constructor(mut self, inputs: &[(&str, &str)]) -> Self {
        self.entries.push(RawLegacyAbiEntry::Constructor(RawLegacyConstructor {
            inputs: params(inputs),
            name: "constructor".to_string(),
            outputs: vec![],
        }));
        self
    }

    /// Appends an event with the given data members
    pub fn with_event(mut self, name: &str, data: &[(&str, &str)]) -> Self {
        self.entries.push(RawLegacyAbiEntry::Event(RawLegacyEvent {
            data: params(data),
            keys: vec![],
            name: name.to_string(),
        }));
        self
    }

    /// Appends the `Uint256` struct definition
    pub fn with_uint256_struct(mut self) -> Self {
        let member = |name: &str, offset| RawLegacyMember {
            name: name.to_string(),
            offset,
            r#type: FELT_TYPE.to_string(),
        };

        self.entries.push(RawLegacyAbiEntry::Struct(RawLegacyStruct {
            members: vec![member("low", 0), member("high", 1)],
            name: UINT256_TYPE.to_string(),
            size: 2,
        }));
        self
    }

    /// Appends a function entry
    fn with_function(
        mut self,
        name: &str,
        inputs: &[(&str, &str)],
        outputs: &[(&str, &str)],
        state_mutability: Option<FunctionStateMutability>,
    ) -> Self {
        self.entries.push(RawLegacyAbiEntry::Function(RawLegacyFunction {
            inputs: params(inputs),
            name: name.to_string(),
            outputs: params(outputs),
            state_mutability,
        }));
        self
    }
}

/// Builds ABI parameters from `(name, type)` pairs
fn params(pairs: &[(&str, &str)]) -> Vec<LegacyTypedParameter> {
    pairs
        .iter()
        .map(|(name, ty)| LegacyTypedParameter {
            name: name.to_string(),
            r#type: ty.to_string(),
        })
        .collect()
}
