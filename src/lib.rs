//! Metareplay - a positional annotation index.
//!
//! Labels attached to a document commit transitions (bundles of property
//! assignments) at positions along it. This crate answers two questions about
//! such a document:
//!
//! - what is the combined state at position X (`MetaReplay`), and
//! - which labeled spans cover position X (`IntervalIndex`).
//!
//! Positions are opaque: anything with a total order, supplied either as
//! `Ord` or as a `Comparator`.
//!
//! # Quick Start
//!
//! ```
//! use metareplay::{Interval, IntervalIndex, MetaReplay, Transition};
//!
//! let mut replay = MetaReplay::new();
//! let happy: Transition = [("char", "emotion", "happy")].into_iter().collect();
//! let sad: Transition = [("char", "emotion", "sad")].into_iter().collect();
//!
//! replay.add(10, &happy);
//! replay.add(5, &sad);
//! assert_eq!(replay.get(&7).get("char", "emotion"), Some("sad"));
//! assert_eq!(replay.get(&12).get("char", "emotion"), Some("happy"));
//!
//! replay.remove(&10, &happy).unwrap();
//! assert_eq!(replay.get(&12).get("char", "emotion"), Some("sad"));
//!
//! let mut labels = IntervalIndex::new();
//! labels.add(Interval::new(0, 10), "dialogue");
//! labels.add(Interval::new(4, 6), "whisper");
//! assert_eq!(labels.get_all(&5).len(), 2);
//! ```
//!
//! # Threading
//!
//! Nothing here locks. Every operation runs to completion on the calling
//! thread; share an instance across threads only behind a single mutex.

pub mod config;
pub mod display;
pub mod error;
pub mod interval;
pub mod meta;
pub mod order;
pub mod replay;
pub mod tree;

pub use config::RepairMode;
pub use config::ReplayConfig;
pub use error::ReplayError;
pub use interval::Interval;
pub use interval::IntervalIndex;
pub use meta::MetaState;
pub use meta::Transition;
pub use meta::TransitionId;
pub use order::Comparator;
pub use order::NaturalOrder;
pub use replay::ListenerId;
pub use replay::MetaReplay;
pub use tree::NodeRef;
pub use tree::PositionTree;
