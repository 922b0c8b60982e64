//! Fixed-capacity map built on coalesced hashing.
//!
//! Every entry - colliding or not - lives inside one contiguous arena
//! allocated at construction. Collisions are resolved by linking through
//! slots the hash function has not claimed, not by external chaining or
//! re-probing, so the map performs no per-node allocation and no rehash:
//! all memory work happens in the constructor and the destructor.
//!
//! # Layout
//!
//! ```text
//! index:  0 ......... address_len-1 | address_len ........ capacity-1 | capacity
//!         [ address region          ] [ cellar (overflow only)       ] [ anchor ]
//! ```
//!
//! Keys hash into the address region only. A colliding entry is placed in
//! a free slot - scanned downward from the high end of the table, or
//! probed near the collision under [`InsertionMode::Eich`] - and spliced
//! into its bucket's chain through bit-packed intrusive links. The same
//! links form one global traversal list anchored at the sentinel slot, so
//! iteration walks exactly the live entries and never scans empty slots.
//!
//! # Quick start
//!
//! ```
//! use coalmap::CoalescedMap;
//!
//! let mut map: CoalescedMap<u64, &str> = CoalescedMap::with_capacity(16);
//!
//! let (_, inserted) = map.try_insert(7, "seven").unwrap();
//! assert!(inserted);
//!
//! // First insert wins; re-inserting an existing key changes nothing.
//! let (cursor, inserted) = map.try_insert(7, "SEVEN").unwrap();
//! assert!(!inserted);
//! assert_eq!(cursor.value(), Some(&"seven"));
//!
//! assert_eq!(map.get(&7), Some(&"seven"));
//! assert!(map.find(&8).is_end());
//!
//! for (key, value) in &map {
//!     println!("{key}: {value}");
//! }
//! ```
//!
//! # Insertion modes
//!
//! | Mode | Collision placement | Fallback |
//! |------|---------------------|----------|
//! | [`InsertionMode::Lich`] | free-tail scan from the high end of the table | none - fails when exhausted |
//! | [`InsertionMode::Eich`] | bounded linear probe after the home slot | free-tail scan |
//! | [`InsertionMode::Vich`] | alias of `Eich` | free-tail scan |
//!
//! # What this map does not do
//!
//! No deletion and no growth. The free-slot cursor only moves downward;
//! space it has passed is never reconsidered, so a full table stays full
//! until [`CoalescedMap::clear`] rebuilds it. Callers that outgrow a map
//! collect it into a larger one.
//!
//! Single-writer: share a map across threads only behind an external lock.
//! Every operation completes within its call, so serializing whole calls
//! is enough.

#![warn(missing_docs)]

mod arena;
mod error;
mod iter;
mod link;
mod map;

pub use error::{BuildError, Full};
pub use iter::{Cursor, Iter, IterMut, Keys, Values};
pub use map::{CoalescedMap, DefaultHashBuilder, InsertionMode, MapBuilder, MAX_CAPACITY};
