//! Serialization of values to & from contract calldata

use starknet::core::types::FieldElement;

use crate::{encoding::felt_to_usize, errors::EncodingError, types::Uint256};

/// A type that can be serialized into contract calldata
pub trait CalldataSerializable {
    /// Serializes the value into a list of field elements
    fn to_calldata(&self) -> Vec<FieldElement>;
}

impl CalldataSerializable for FieldElement {
    fn to_calldata(&self) -> Vec<FieldElement> {
        vec![*self]
    }
}

impl CalldataSerializable for bool {
    fn to_calldata(&self) -> Vec<FieldElement> {
        vec![FieldElement::from(*self as u8)]
    }
}

/// Arrays are serialized Cairo-style, prefixed by their length
impl<T: CalldataSerializable> CalldataSerializable for [T] {
    fn to_calldata(&self) -> Vec<FieldElement> {
        let mut calldata = vec![FieldElement::from(self.len())];
        calldata.extend(self.iter().flat_map(|value| value.to_calldata()));
        calldata
    }
}

impl<T: CalldataSerializable> CalldataSerializable for Vec<T> {
    fn to_calldata(&self) -> Vec<FieldElement> {
        self.as_slice().to_calldata()
    }
}

/// A cursor over calldata, decoding values in the order an entry point declares them
#[derive(Debug)]
pub struct CalldataReader<'a> {
    /// The calldata being read
    calldata: &'a [FieldElement],
    /// The index of the next element to read
    cursor: usize,
}

impl<'a> CalldataReader<'a> {
    /// Creates a reader positioned at the start of the calldata
    pub fn new(calldata: &'a [FieldElement]) -> Self {
        Self {
            calldata,
            cursor: 0,
        }
    }

    /// Reads the next `n` elements
    pub fn next_slice(&mut self, n: usize) -> Result<&'a [FieldElement], EncodingError> {
        let end = self
            .cursor
            .checked_add(n)
            .filter(|end| *end <= self.calldata.len())
            .ok_or(EncodingError::CalldataTooShort {
                expected: self.cursor.saturating_add(n),
                actual: self.calldata.len(),
            })?;

        let slice = &self.calldata[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    /// Reads a single field element
    pub fn next_felt(&mut self) -> Result<FieldElement, EncodingError> {
        self.next_slice(1).map(|slice| slice[0])
    }

    /// Reads a `Uint256`, low limb first
    pub fn next_uint256(&mut self) -> Result<Uint256, EncodingError> {
        let low = self.next_felt()?;
        let high = self.next_felt()?;
        Uint256::from_felts(low, high)
    }

    /// Reads a length-prefixed array of field elements
    pub fn next_array(&mut self) -> Result<Vec<FieldElement>, EncodingError> {
        let len = felt_to_usize(self.next_felt()?)?;
        self.next_slice(len).map(<[FieldElement]>::to_vec)
    }

    /// Asserts that every element has been consumed
    pub fn finish(self) -> Result<(), EncodingError> {
        match self.calldata.len() - self.cursor {
            0 => Ok(()),
            trailing => Err(EncodingError::TrailingCalldata(trailing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_decodes_mixed_calldata() {
        let calldata = [
            FieldElement::from(7_u8),
            FieldElement::from(2_u8),
            FieldElement::from(3_u8),
            FieldElement::from(4_u8),
            FieldElement::from(8000_u64),
            FieldElement::ZERO,
        ];
        let mut reader = CalldataReader::new(&calldata);

        assert_eq!(reader.next_felt().unwrap(), FieldElement::from(7_u8));
        assert_eq!(
            reader.next_array().unwrap(),
            vec![FieldElement::from(3_u8), FieldElement::from(4_u8)]
        );
        assert_eq!(reader.next_uint256().unwrap(), Uint256::from(8000_u128));
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_reader_short_calldata() {
        let calldata = [FieldElement::from(5_u8), FieldElement::ONE];
        let mut reader = CalldataReader::new(&calldata);

        assert_eq!(
            reader.next_array(),
            Err(EncodingError::CalldataTooShort {
                expected: 6,
                actual: 2
            })
        );
    }

    #[test]
    fn test_reader_trailing_calldata() {
        let calldata = [FieldElement::ONE, FieldElement::from(2_u8)];
        let mut reader = CalldataReader::new(&calldata);
        reader.next_felt().unwrap();

        assert_eq!(reader.finish(), Err(EncodingError::TrailingCalldata(1)));
    }
}
