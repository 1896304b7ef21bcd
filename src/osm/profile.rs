// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::Config;

/// Decides whether an [OSM way](https://wiki.openstreetmap.org/wiki/Way)
/// is a driveable street, based on its tags and the sets in a [Config].
///
/// A way is driveable iff all of the following hold:
/// 1. its `highway` tag is in [Config::allowed_highways];
/// 2. its `highway` tag is not in [Config::excluded_highways];
/// 3. its `service` tag, if present, is not in [Config::excluded_service_values];
/// 4. its `access` tag, if present, is not in [Config::excluded_access_values].
///
/// Structural checks (at least two nodes, all node references known)
/// are performed separately by the road-network builder, which also
/// reads the `oneway` tag, but only to count it, never to route on it.
#[derive(Debug, Clone, Copy)]
pub struct CollectionProfile<'a> {
    config: &'a Config,
}

impl<'a> CollectionProfile<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Checks the tag contract above. Ways failing it are dropped
    /// silently; they contribute no graph nodes or edges.
    pub fn is_driveable(&self, tags: &HashMap<String, String>) -> bool {
        let highway = match tags.get("highway") {
            Some(v) => v.as_str(),
            None => return false,
        };

        if self.config.excluded_highways.contains(highway) {
            return false;
        }
        if !self.config.allowed_highways.contains(highway) {
            return false;
        }

        if let Some(service) = tags.get("service") {
            if self.config.excluded_service_values.contains(service) {
                return false;
            }
        }

        if let Some(access) = tags.get("access") {
            if self.config.excluded_access_values.contains(access) {
                return false;
            }
        }

        true
    }

    /// Returns whether the way carries any one-way restriction.
    /// `oneway=no` is an explicit "not restricted" and reports false.
    pub fn is_oneway_tagged(&self, tags: &HashMap<String, String>) -> bool {
        match tags.get("oneway").map(|v| v.as_str()) {
            None | Some("no") => false,
            Some(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn accepts_allowed_highways() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        assert!(p.is_driveable(&tags! {"highway": "residential"}));
        assert!(p.is_driveable(&tags! {"highway": "unclassified"}));
        assert!(p.is_driveable(&tags! {"highway": "service"}));
        assert!(p.is_driveable(&tags! {"highway": "tertiary"}));
        assert!(p.is_driveable(&tags! {"highway": "secondary"}));
    }

    #[test]
    fn rejects_missing_or_unknown_highway() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        assert!(!p.is_driveable(&tags! {}));
        assert!(!p.is_driveable(&tags! {"building": "yes"}));
        assert!(!p.is_driveable(&tags! {"highway": "motorway"}));
    }

    #[test]
    fn rejects_non_driveable_highways() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        assert!(!p.is_driveable(&tags! {"highway": "footway"}));
        assert!(!p.is_driveable(&tags! {"highway": "cycleway"}));
        assert!(!p.is_driveable(&tags! {"highway": "steps"}));
        assert!(!p.is_driveable(&tags! {"highway": "path"}));
        assert!(!p.is_driveable(&tags! {"highway": "track"}));
        assert!(!p.is_driveable(&tags! {"highway": "pedestrian"}));
    }

    #[test]
    fn excluded_set_guards_a_broadened_allowed_set() {
        let mut config = Config::default();
        config.allowed_highways.insert("footway".to_string());
        let p = CollectionProfile::new(&config);
        assert!(!p.is_driveable(&tags! {"highway": "footway"}));
    }

    #[test]
    fn rejects_parking_service_ways() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        assert!(!p.is_driveable(&tags! {"highway": "service", "service": "parking_aisle"}));
        assert!(!p.is_driveable(&tags! {"highway": "service", "service": "parking"}));
        assert!(p.is_driveable(&tags! {"highway": "service", "service": "driveway"}));
    }

    #[test]
    fn rejects_restricted_access() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        assert!(!p.is_driveable(&tags! {"highway": "residential", "access": "private"}));
        assert!(!p.is_driveable(&tags! {"highway": "residential", "access": "no"}));
        assert!(p.is_driveable(&tags! {"highway": "residential", "access": "destination"}));
    }

    #[test]
    fn oneway_is_read_but_never_routes() {
        let config = Config::default();
        let p = CollectionProfile::new(&config);
        // A one-way residential street stays driveable in both directions.
        assert!(p.is_driveable(&tags! {"highway": "residential", "oneway": "yes"}));
        assert!(p.is_oneway_tagged(&tags! {"highway": "residential", "oneway": "yes"}));
        assert!(p.is_oneway_tagged(&tags! {"highway": "residential", "oneway": "-1"}));
        assert!(!p.is_oneway_tagged(&tags! {"highway": "residential", "oneway": "no"}));
        assert!(!p.is_oneway_tagged(&tags! {"highway": "residential"}));
    }
}
