//! Domain document models
//!
//! - [`actor`] - user/partner actor references
//! - [`item`] - catalog items with color/size SKU variants and stock
//! - [`cart`] - per-actor staged selections awaiting checkout
//! - [`address`] - shipping/pickup addresses
//! - [`wallet`] - partner wallet ledger

pub mod actor;
pub mod address;
pub mod cart;
pub mod item;
pub mod wallet;

pub use actor::{ActorKind, ActorRef};
pub use address::Address;
pub use cart::{Cart, CartLine};
pub use item::{ColorGroup, Item, PriceTier, SizeVariant};
pub use wallet::{TransactionKind, Wallet, WalletTransaction};
