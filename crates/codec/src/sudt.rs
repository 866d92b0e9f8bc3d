use rollup_client_primitives::{
    molecule::{self, Entity, Molecule},
    AccountId,
};

/// The arguments of a call to a simple UDT account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SudtArgs {
    /// Reads the balance of an account.
    Query {
        /// The queried account.
        account_id: AccountId,
    },
    /// Transfers tokens from the sender to another account.
    Transfer {
        /// The receiver account.
        to: AccountId,
        /// The transferred amount.
        amount: u128,
        /// The fee paid to the block producer.
        fee: u128,
    },
}

impl SudtArgs {
    const QUERY_ID: u32 = 0;
    const TRANSFER_ID: u32 = 1;
}

impl Molecule for SudtArgs {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        let encoded = match self {
            Self::Query { account_id } => molecule::union(
                Self::QUERY_ID,
                &molecule::table(&[molecule::uint32(*account_id).as_slice()]),
            ),
            Self::Transfer { to, amount, fee } => molecule::union(
                Self::TRANSFER_ID,
                &molecule::table(&[
                    molecule::uint32(*to).as_slice(),
                    molecule::uint128(*amount).as_slice(),
                    molecule::uint128(*fee).as_slice(),
                ]),
            ),
        };
        out.extend_from_slice(&encoded);
    }
}
