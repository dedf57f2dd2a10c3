//! Building and flattening of CallFlows.
//!
//! A CallFlow is authored as a `models::CallFlowDef`. `build_call_flow`
//! turns it into the `domain` tree submitted to the remote API, and
//! `flatten_call_flow` turns a fetched `remote::RemoteCallFlow` back into a
//! `models::CallFlowDef` which is comparable with the authored document.

mod build;
mod depth;
pub mod domain;
mod echo;
mod errors;
mod flatten;
mod location;
pub mod remote;
mod settings;

pub use build::{build, build_call_flow};
pub use depth::{check_call_flow, check_depth};
pub use echo::{echo_enrichment_order, echo_references, ShortReference};
pub use errors::Error;
pub use flatten::{flatten, flatten_call_flow, flatten_nested, flatten_root, into_config};
pub use location::{LocatedItem, LocatedProperty, Location, PointerStr};
pub use remote::{NodeRepr, RemoteCallFlow, RemoteId};
pub use settings::{DepthPolicy, LengthPolicy, Settings};
