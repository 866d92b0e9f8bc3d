use alloy_primitives::U256;

/// An error occurring during the encoding of call arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The intent cannot be encoded.
    #[error("invalid encoding input: {0}")]
    InvalidEncodingInput(#[from] InvalidInputError),
}

/// The reason an intent cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    /// The encoded args exceed the maximum accepted by the rollup.
    #[error("encoded args of {len} bytes exceed the maximum of {max} bytes")]
    ArgsTooLong {
        /// The encoded length.
        len: usize,
        /// The maximum length.
        max: usize,
    },
    /// The gas price does not fit the 16 bytes field of the contract call header.
    #[error("gas price {0} does not fit 16 bytes")]
    GasPriceOverflow(U256),
}
