//! `acc-spatial` — network, least-cost trees, zones, and measuring grids.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Network` (CSR + R-tree), `NetworkBuilder`                  |
//! | [`reader`]  | `read_network`, `read_network_file` (network XML)           |
//! | [`router`]  | `Router` trait, `LeastCostTree`, `DijkstraRouter`, `TravelSpeeds` |
//! | [`zones`]   | `ZonePartitioner`, `PartitionMode`, `ZoneGrid`, `Zone`      |
//! | [`index`]   | `SpatialIndex`, `IndexTypes`                                |
//! | [`grid`]    | `MeasuringGrid`, `MeasuringPoint`                           |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on core and scenario types. |

pub mod error;
pub mod grid;
pub mod index;
pub mod network;
pub mod reader;
pub mod router;
pub mod zones;


pub use error::{SpatialError, SpatialResult};
pub use grid::{MeasuringGrid, MeasuringPoint};
pub use index::{IndexTypes, SpatialIndex};
pub use network::{Network, NetworkBuilder};
pub use reader::{read_network, read_network_file};
pub use router::{DijkstraRouter, LeastCostTree, Router, TravelSpeeds};
pub use zones::{MAX_ZONES_PER_AXIS, PartitionMode, ZONE_PADDING, Zone, ZoneGrid, ZonePartitioner};
