//! Mapping symbolic traffic origins to the initial states of a reachability query.

use crate::error::QueryError;
use crate::graph::{PipelineState, TransitionGraph};
use crate::header_space::HeaderField;
use crate::model::{Configuration, IpSpace, Location};
use biodivine_lib_bdd::Bdd;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};


/// Which interfaces and VRFs exist in a snapshot, kept by the graph so that queries
/// can be validated without the configuration model.
pub(crate) struct LocationIndex {
    interface_vrf: BTreeMap<(String, String), String>,
    vrfs: BTreeSet<(String, String)>,
}

impl LocationIndex {
    pub fn new(configs: &BTreeMap<String, Configuration>) -> LocationIndex {
        let mut interface_vrf = BTreeMap::new();
        let mut vrfs = BTreeSet::new();
        for (node, config) in configs {
            for interface in config.interfaces.values() {
                interface_vrf.insert(
                    (node.clone(), interface.name.clone()),
                    interface.vrf.clone(),
                );
            }
            for vrf in config.vrfs.keys() {
                vrfs.insert((node.clone(), vrf.clone()));
            }
        }
        LocationIndex {
            interface_vrf,
            vrfs,
        }
    }

    /// The originate state of a location, or `None` if the location does not exist.
    pub fn resolve(&self, location: &Location) -> Option<PipelineState> {
        match location {
            Location::InterfaceLink { node, interface } => {
                let key = (node.clone(), interface.clone());
                self.interface_vrf
                    .contains_key(&key)
                    .then(|| PipelineState::originate_interface_link(node, interface))
            }
            Location::Interface { node, interface } => {
                let key = (node.clone(), interface.clone());
                let vrf = self.interface_vrf.get(&key)?;
                self.vrfs
                    .contains(&(node.clone(), vrf.clone()))
                    .then(|| PipelineState::originate_vrf(node, vrf))
            }
            Location::Vrf { node, vrf } => self
                .vrfs
                .contains(&(node.clone(), vrf.clone()))
                .then(|| PipelineState::originate_vrf(node, vrf)),
        }
    }
}

/// The traffic injected by a query: every entry allows the given headers at all its locations.
#[derive(Clone, Debug, Default)]
pub struct OriginAssignment {
    entries: Vec<(Vec<Location>, Bdd)>,
}

impl OriginAssignment {
    pub fn new() -> OriginAssignment {
        OriginAssignment::default()
    }

    /// Allow packets in `headers` to enter at every location in `locations`.
    pub fn assign(mut self, locations: Vec<Location>, headers: Bdd) -> OriginAssignment {
        self.entries.push((locations, headers));
        self
    }

    /// Allow packets with a source IP in `sources` (and any other header values) to enter
    /// at every location in `locations`.
    pub fn assign_src_ips(
        self,
        graph: &TransitionGraph,
        locations: Vec<Location>,
        sources: &IpSpace,
    ) -> Result<OriginAssignment, QueryError> {
        let headers = graph.packet().mk_ip_space(HeaderField::SrcIp, sources)?;
        Ok(self.assign(locations, headers))
    }

    /// Iterate `(location, headers)` over all assigned locations.
    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Bdd)> {
        self.entries
            .iter()
            .flat_map(|(locations, headers)| locations.iter().map(move |it| (it, headers)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(locations, _)| locations.is_empty())
    }
}

/// Initial header spaces of the originate states of one query.
#[derive(Clone, Debug, Default)]
pub struct RootAssignment {
    roots: BTreeMap<PipelineState, Bdd>,
}

impl RootAssignment {
    /// Resolve every origin to its originate state in `graph`, constraining its headers
    /// with `destination`.
    ///
    /// Origins resolving to the same state are merged by union. The graph coarsening is
    /// applied to every root, so that roots are as precise as the rest of the graph.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnknownLocation`] if a location does not exist in the snapshot.
    pub fn resolve(
        graph: &TransitionGraph,
        origins: &OriginAssignment,
        destination: &Bdd,
    ) -> Result<RootAssignment, QueryError> {
        let packet = graph.packet();
        let coarsening = graph.coarsening();
        let mut result = RootAssignment::default();
        for (location, headers) in origins.iter() {
            let state = graph
                .locations()
                .resolve(location)
                .ok_or_else(|| QueryError::UnknownLocation(location.clone()))?;
            debug!("Root {state} resolved from {location}.");
            result.insert(state, coarsening.apply(packet, &headers.and(destination)));
        }
        Ok(result)
    }

    /// Bind a header space directly to an originate state. Existing bindings are extended by
    /// union.
    pub fn insert(&mut self, state: PipelineState, headers: Bdd) {
        debug_assert!(state.is_originate(), "{state} is not an originate state");
        let merged = match self.roots.remove(&state) {
            Some(existing) => existing.or(&headers),
            None => headers,
        };
        self.roots.insert(state, merged);
    }

    pub fn get(&self, state: &PipelineState) -> Option<&Bdd> {
        self.roots.get(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PipelineState, &Bdd)> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl IntoIterator for RootAssignment {
    type Item = (PipelineState, Bdd);
    type IntoIter = std::collections::btree_map::IntoIter<PipelineState, Bdd>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.into_iter()
    }
}
