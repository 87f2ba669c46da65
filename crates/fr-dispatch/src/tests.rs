//! Unit tests for the dispatch coordinator.

#[cfg(test)]
mod helpers {
    use fr_core::{CitizenId, NodeId, Point2, Tick};
    use fr_agents::{Citizen, CitizenState, CitizenStore, DecisionMode, RescueUnit, UnitStore};
    use fr_network::{RoadNetwork, RoadNetworkBuilder};

    /// A line network: N0 --10-- N1 --10-- N2 --10-- N3 --10-- N4.
    pub fn line(n: usize) -> (RoadNetwork, Vec<NodeId>) {
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| b.add_node(Point2::new(i as f64 * 10.0, 0.0)))
            .collect();
        for w in nodes.windows(2) {
            b.add_road(w[0], w[1], 10.0);
        }
        (b.build().unwrap(), nodes)
    }

    pub fn critical_citizens_at(nodes: &[NodeId]) -> CitizenStore {
        let mut store = CitizenStore::new(
            nodes
                .iter()
                .map(|&n| Citizen::new(n, DecisionMode::Random, 1.5))
                .collect(),
        );
        for i in 0..nodes.len() {
            store.set_state(CitizenId(i as u32), CitizenState::CriticallyUnsafe, Tick(0));
        }
        store
    }

    pub fn units_at(nodes: &[NodeId]) -> UnitStore {
        UnitStore::new(nodes.iter().map(|&n| RescueUnit::new(n, 8.0, 2)).collect())
    }

    pub fn force_unsafe(net: &mut RoadNetwork, u: NodeId, v: NodeId) {
        for e in 0..net.edge_count() {
            let (f, t) = (net.edge_from[e], net.edge_to[e]);
            if (f == u && t == v) || (f == v && t == u) {
                net.edge_safe[e] = false;
            }
        }
    }
}

#[cfg(test)]
mod dispatch {
    use fr_core::{CitizenId, Tick, UnitId};
    use fr_agents::UnitState;
    use fr_network::{DijkstraRouter, PathPolicy};

    use super::helpers::{critical_citizens_at, force_unsafe, line, units_at};
    use crate::DispatchCoordinator;

    #[test]
    fn cadence() {
        let every3 = DispatchCoordinator::new(3);
        assert!(every3.is_due(Tick(0)));
        assert!(!every3.is_due(Tick(1)));
        assert!(!every3.is_due(Tick(2)));
        assert!(every3.is_due(Tick(3)));

        let every1 = DispatchCoordinator::new(1);
        assert!(every1.is_due(Tick(17)));
    }

    #[test]
    fn nearest_available_unit_wins() {
        let (net, nodes) = line(5);
        let citizens = critical_citizens_at(&[nodes[2]]);
        // Unit 0 at N0 (20 m away), unit 1 at N3 (10 m away).
        let mut units = units_at(&[nodes[0], nodes[3]]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].unit, UnitId(1));
        assert_eq!(assignments[0].citizen, CitizenId(0));
        assert_eq!(assignments[0].distance_m, 10.0);
        assert_eq!(units.get(UnitId(1)).state, UnitState::OnMission);
        assert_eq!(units.get(UnitId(0)).state, UnitState::Available);
    }

    #[test]
    fn distance_tie_goes_to_lower_unit_id() {
        let (net, nodes) = line(5);
        let citizens = critical_citizens_at(&[nodes[2]]);
        // Both units 20 m away, one per side.
        let mut units = units_at(&[nodes[0], nodes[4]]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].unit, UnitId(0));
    }

    #[test]
    fn no_duplicate_assignment_across_rounds() {
        let (net, nodes) = line(5);
        let citizens = critical_citizens_at(&[nodes[2]]);
        let mut units = units_at(&[nodes[0], nodes[4]]);
        let coordinator = DispatchCoordinator::new(1);

        let first = coordinator.dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert_eq!(first.len(), 1);

        // The citizen is still critical, but already targeted: the second
        // round must not send the other unit too.
        let second = coordinator.dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert!(second.is_empty());
        assert_eq!(units.available_count(), 1);

        let targeting: Vec<UnitId> = units
            .iter()
            .filter(|(_, u)| u.target == Some(CitizenId(0)))
            .map(|(id, _)| id)
            .collect();
        assert_eq!(targeting.len(), 1);
    }

    #[test]
    fn one_unit_per_citizen_in_one_round() {
        let (net, nodes) = line(5);
        // Two critical citizens, one unit: only the nearer citizen (by id
        // order, both reachable) gets covered this round.
        let citizens = critical_citizens_at(&[nodes[1], nodes[3]]);
        let mut units = units_at(&[nodes[2]]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].citizen, CitizenId(0));
        // Citizen 1 stays queued for the next round.
        assert_eq!(citizens.critical_sorted().len(), 2);
    }

    #[test]
    fn no_available_units_leaves_citizens_queued() {
        let (net, nodes) = line(3);
        let citizens = critical_citizens_at(&[nodes[0]]);
        let mut units = units_at(&[]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert!(assignments.is_empty());
        assert_eq!(citizens.critical_count(), 1);
    }

    #[test]
    fn unreachable_citizen_stays_unassigned() {
        // Two disconnected segments: unit on one, citizen on the other.
        let (net, nodes) = {
            let mut b = fr_network::RoadNetworkBuilder::new();
            let n0 = b.add_node(fr_core::Point2::new(0.0, 0.0));
            let n1 = b.add_node(fr_core::Point2::new(10.0, 0.0));
            let n2 = b.add_node(fr_core::Point2::new(100.0, 0.0));
            let n3 = b.add_node(fr_core::Point2::new(110.0, 0.0));
            b.add_road(n0, n1, 10.0);
            b.add_road(n2, n3, 10.0);
            (b.build().unwrap(), [n0, n1, n2, n3])
        };
        let citizens = critical_citizens_at(&[nodes[2]]);
        let mut units = units_at(&[nodes[0]]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert!(assignments.is_empty());
        assert_eq!(units.get(UnitId(0)).state, UnitState::Available);
        assert_eq!(citizens.critical_count(), 1);
    }

    #[test]
    fn flooded_roads_fall_back_to_full_graph() {
        let (mut net, nodes) = line(3);
        // Every road under water: the safe subgraph is empty.
        force_unsafe(&mut net, nodes[0], nodes[1]);
        force_unsafe(&mut net, nodes[1], nodes[2]);
        let citizens = critical_citizens_at(&[nodes[2]]);
        let mut units = units_at(&[nodes[0]]);

        let assignments = DispatchCoordinator::new(1).dispatch(
            &citizens, &mut units, &net, &DijkstraRouter, PathPolicy::SafeThenFull,
        );
        assert_eq!(assignments.len(), 1);
        assert_eq!(units.get(UnitId(0)).state, UnitState::OnMission);

        // Under SafeOnly the same situation stalls the assignment instead.
        let citizens2 = critical_citizens_at(&[nodes[2]]);
        let mut units2 = units_at(&[nodes[0]]);
        let assignments2 = DispatchCoordinator::new(1).dispatch(
            &citizens2, &mut units2, &net, &DijkstraRouter, PathPolicy::SafeOnly,
        );
        assert!(assignments2.is_empty());
        assert_eq!(units2.get(UnitId(0)).state, UnitState::Available);
    }
}
