//! Smart contract descriptor records.
//!
//! ```text
//! Contract
//! ├── 1 id: text
//! ├── 2 info: Info (optional)
//! │   ├── 1 lang: text
//! │   ├── 2 version: text
//! │   └── 3 abi: [Abi]
//! │       ├── 1 name: text
//! │       ├── 2 args: [text]
//! │       └── 3 amount_limit: [Amount]
//! │           ├── 1 token: text
//! │           └── 2 val: text
//! └── 3 code: text
//! ```
//!
//! Field numbers are part of the wire contract. They are never renumbered
//! and a retired number is never given to a different field.

mod abi;
mod amount;
mod contract;
mod info;

pub use abi::Abi;
pub use amount::Amount;
pub use contract::Contract;
pub use info::Info;
