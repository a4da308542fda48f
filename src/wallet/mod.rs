// Wallet: addresses, keys and transaction building

mod address;
mod keypair;
mod tx_builder;

pub use address::{Address, AddressError, ADDRESS_VERSION, PAYLOAD_LEN};
pub use keypair::KeyPair;
pub use tx_builder::{TransactionBuilder, WalletError};
