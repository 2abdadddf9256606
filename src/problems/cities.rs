//! Road maps between cities.
//!
//! Graphs are read from a JSON list of elements, each wrapping its fields in
//! `data`:
//! - cities: `{"data": {"id": "8", "label": "Irkutsk"}}`
//! - roads: `{"data": {"source": "8", "target": "9", "weight": 420}}`
//!
//! Roads are two-way. Anything else in the list is ignored.

use derive_more::Display;
use log::debug;
use log::warn;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;

use crate::float_cost::FloatCost;
use crate::problem::Actions;
use crate::problem::Problem;
use crate::space::Action;
use crate::space::State;

pub type Distance = FloatCost<f64>;

/// Position of a city in its graph. Cities keep the order they were added in.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{_0}")]
pub struct CityId(usize);

impl State for CityId {}
/// Driving to a neighbouring city.
impl Action for CityId {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct City {
    /// Identifier used by the source data.
    pub key: String,
    pub label: String,
}

#[derive(Debug, Error)]
pub enum CityGraphError {
    #[error("I/O error when loading '{p}': {e}")]
    Io {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
    #[error("Malformed graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown city '{0}'")]
    UnknownCity(String),
    #[error("City '{0}' declared twice")]
    DuplicateCity(String),
    #[error("Road {from}-{to} has invalid weight {weight}")]
    InvalidWeight { from: String, to: String, weight: f64 },
}

#[derive(Deserialize)]
struct Element {
    data: ElementData,
}

/// Fields of a graph element. Records that are neither a city nor a road are
/// ignored, but known fields must have the right type.
#[derive(Deserialize)]
struct ElementData {
    id: Option<String>,
    label: Option<String>,
    source: Option<String>,
    target: Option<String>,
    weight: Option<f64>,
}

impl ElementData {
    fn road(&self) -> Option<(&str, &str, Option<f64>)> {
        let source = self.source.as_deref()?;
        let target = self.target.as_deref()?;
        Some((source, target, self.weight))
    }

    /// Roads may carry an id too, but are never cities.
    fn city(&self) -> Option<(&str, &str)> {
        if self.road().is_some() {
            return None;
        }
        Some((self.id.as_deref()?, self.label.as_deref()?))
    }
}

/// An undirected weighted graph of cities.
#[derive(Clone, Default)]
pub struct CityGraph {
    cities: Vec<City>,
    index: FxHashMap<String, CityId>,
    /// Neighbours of each city, sorted by id.
    roads: Vec<Vec<(CityId, Distance)>>,
}

impl CityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_city(&mut self, key: &str, label: &str) -> Result<CityId, CityGraphError> {
        if self.index.contains_key(key) {
            return Err(CityGraphError::DuplicateCity(key.to_string()));
        }
        let id = CityId(self.cities.len());
        self.cities.push(City {
            key: key.to_string(),
            label: label.to_string(),
        });
        self.index.insert(key.to_string(), id);
        self.roads.push(vec![]);
        Ok(id)
    }

    /// Adds a two-way road, replacing any previous road between `a` and `b`.
    pub fn add_road(&mut self, a: CityId, b: CityId, weight: f64) -> Result<(), CityGraphError> {
        if weight.is_nan() || weight < 0.0 {
            return Err(CityGraphError::InvalidWeight {
                from: self.cities[a.0].key.clone(),
                to: self.cities[b.0].key.clone(),
                weight,
            });
        }
        let d = Distance::new(weight);
        self.insert_road(a, b, d);
        if a != b {
            self.insert_road(b, a, d);
        }
        Ok(())
    }

    fn insert_road(&mut self, from: CityId, to: CityId, d: Distance) {
        let roads = &mut self.roads[from.0];
        match roads.binary_search_by_key(&to, |&(c, _)| c) {
            Ok(i) => roads[i].1 = d,
            Err(i) => roads.insert(i, (to, d)),
        }
    }

    /// Parses a graph, keeping only the cities in `selection` (all when
    /// `None`) and the roads between kept cities.
    pub fn from_json_str(
        s: &str,
        selection: Option<&FxHashSet<String>>,
    ) -> Result<Self, CityGraphError> {
        let elements: Vec<Element> = serde_json::from_str(s)?;

        let mut graph = Self::new();
        let mut declared = FxHashSet::default();
        for e in &elements {
            if let Some((id, label)) = e.data.city() {
                declared.insert(id);
                if selection.is_none_or(|s| s.contains(id)) {
                    graph.add_city(id, label)?;
                }
            }
        }

        for e in &elements {
            let Some((source, target, weight)) = e.data.road() else {
                continue;
            };
            if !declared.contains(source) || !declared.contains(target) {
                warn!("Skipping road {source}-{target}, it leads to an undeclared city");
                continue;
            }
            let (Some(&a), Some(&b)) = (graph.index.get(source), graph.index.get(target)) else {
                continue;
            };
            match weight {
                Some(w) => graph.add_road(a, b, w)?,
                None => warn!("Skipping road {source}-{target}, it has no weight"),
            }
        }

        debug!("Loaded {graph}");
        Ok(graph)
    }

    pub fn load(
        p: &std::path::Path,
        selection: Option<&FxHashSet<String>>,
    ) -> Result<Self, CityGraphError> {
        let s = std::fs::read_to_string(p).map_err(|e| CityGraphError::Io {
            p: p.to_path_buf(),
            e,
        })?;
        Self::from_json_str(&s, selection)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
    /// Number of two-way roads.
    pub fn road_count(&self) -> usize {
        let ends: usize = self.roads.iter().map(Vec::len).sum();
        let loops = self
            .roads
            .iter()
            .enumerate()
            .filter(|(i, r)| r.iter().any(|&(c, _)| c.0 == *i))
            .count();
        (ends + loops) / 2
    }

    pub fn find(&self, key: &str) -> Result<CityId, CityGraphError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| CityGraphError::UnknownCity(key.to_string()))
    }
    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id.0]
    }
    pub fn label(&self, id: CityId) -> &str {
        &self.cities[id.0].label
    }
    pub fn cities(&self) -> impl Iterator<Item = (CityId, &City)> {
        self.cities.iter().enumerate().map(|(i, c)| (CityId(i), c))
    }

    /// Neighbours of `id`, in city order.
    pub fn neighbours(&self, id: CityId) -> &[(CityId, Distance)] {
        &self.roads[id.0]
    }

    /// Length of the road between `a` and `b`, if there is one.
    pub fn distance(&self, a: CityId, b: CityId) -> Option<Distance> {
        let roads = &self.roads[a.0];
        roads
            .binary_search_by_key(&b, |&(c, _)| c)
            .ok()
            .map(|i| roads[i].1)
    }

    /// Labels along `route`, joined with arrows.
    pub fn route(&self, route: &[CityId]) -> String {
        route
            .iter()
            .map(|&c| self.label(c))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl std::fmt::Display for CityGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "CityGraph({} cities, {} roads)",
            self.len(),
            self.road_count()
        )
    }
}

impl std::fmt::Debug for CityGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "CityGraph{{|V|={}}}", self.len())
    }
}

/// Travel between two cities of a graph.
#[derive(Clone, Debug)]
pub struct CityProblem<'g> {
    graph: &'g CityGraph,
    initial: CityId,
    goal: CityId,
}

impl<'g> CityProblem<'g> {
    pub fn new(graph: &'g CityGraph, initial: CityId, goal: CityId) -> Self {
        Self {
            graph,
            initial,
            goal,
        }
    }

    /// Looks cities up by their key.
    pub fn from_keys(graph: &'g CityGraph, from: &str, to: &str) -> Result<Self, CityGraphError> {
        Ok(Self::new(graph, graph.find(from)?, graph.find(to)?))
    }

    pub fn graph(&self) -> &'g CityGraph {
        self.graph
    }
}

impl Problem<CityId, CityId, Distance> for CityProblem<'_> {
    fn initial(&self) -> &CityId {
        &self.initial
    }

    fn goal(&self) -> Option<&CityId> {
        Some(&self.goal)
    }

    fn actions(&self, s: &CityId) -> Actions<CityId> {
        self.graph.neighbours(*s).iter().map(|&(c, _)| c).collect()
    }

    fn result(&self, _s: &CityId, a: &CityId) -> CityId {
        *a
    }

    /// Cities without a road between them are infinitely far apart.
    fn action_cost(&self, s: &CityId, a: &CityId, _s1: &CityId) -> Distance {
        self.graph.distance(*s, *a).unwrap_or(Distance::infinity())
    }
}

impl std::fmt::Display for CityProblem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cities({} -> {})",
            self.graph.label(self.initial),
            self.graph.label(self.goal)
        )
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::algorithms::graph_search::breadth_first_search;
    use crate::cost::Cost;

    const ELEMENTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/cities/elem.json");

    fn selection(keys: &[&str]) -> FxHashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn ten_cities() -> CityGraph {
        let keep = selection(&["8", "9", "2", "15", "6", "1", "3", "7", "13", "18"]);
        CityGraph::load(std::path::Path::new(ELEMENTS), Some(&keep)).unwrap()
    }

    fn full() -> CityGraph {
        CityGraph::load(std::path::Path::new(ELEMENTS), None).unwrap()
    }

    fn keys(graph: &CityGraph, route: &[CityId]) -> Vec<String> {
        route.iter().map(|&c| graph.city(c).key.clone()).collect()
    }

    #[test]
    fn irkutsk_to_ryazan() {
        let graph = ten_cities();
        assert_eq!(graph.len(), 10);
        let problem = CityProblem::from_keys(&graph, "8", "15").unwrap();

        let result = breadth_first_search(&problem);
        let route = result.path_states();
        assert_eq!(keys(&graph, &route), vec!["8", "9", "2", "15"]);
        assert_eq!(graph.route(&route), "Irkutsk -> Kazan -> Belgorod -> Ryazan");
        assert_eq!(result.path_cost(), Distance::new(1100.0));
        assert_eq!(result.path_actions(), route[1..].to_vec());
        let driven: Vec<&str> = result.path_actions().iter().map(|&c| graph.label(c)).collect();
        assert_eq!(driven, ["Kazan", "Belgorod", "Ryazan"]);
        assert!(problem.valid_path(&result.path()));
        assert_eq!(result.statistics().expanded, 4);
        assert_eq!(result.statistics().reached, 7);
    }

    #[test]
    fn routes_are_deterministic() {
        let graph = ten_cities();
        let problem = CityProblem::from_keys(&graph, "3", "9").unwrap();
        let first = breadth_first_search(&problem).path_states();
        assert_eq!(keys(&graph, &first), vec!["3", "1", "2", "9"]);
        for _ in 0..5 {
            let again = CityProblem::from_keys(&ten_cities(), "3", "9")
                .map(|p| keys(p.graph(), &breadth_first_search(&p).path_states()))
                .unwrap();
            assert_eq!(again, keys(&graph, &first));
        }
        for pair in first.windows(2) {
            assert!(graph.distance(pair[0], pair[1]).is_some());
        }
    }

    #[test]
    fn selection_changes_the_route() {
        let graph = full();
        assert_eq!(graph.len(), 18);
        assert_eq!(graph.road_count(), 23);
        let problem = CityProblem::from_keys(&graph, "8", "15").unwrap();
        let result = breadth_first_search(&problem);
        assert_eq!(graph.route(&result.path_states()), "Irkutsk -> Dubna -> Ryazan");
        assert_eq!(result.path_cost(), Distance::new(210.0));

        assert!(matches!(
            ten_cities().find("12"),
            Err(CityGraphError::UnknownCity(_))
        ));
    }

    #[test]
    fn disconnected_cities() {
        let graph = full();
        let problem = CityProblem::from_keys(&graph, "8", "5").unwrap();
        let result = breadth_first_search(&problem);
        assert!(result.is_failure());
        assert!(result.path_states().is_empty());
        assert!(!result.path_cost().valid());
        assert_eq!(result.statistics().reached, 13);

        let next_door = CityProblem::from_keys(&graph, "5", "11").unwrap();
        assert_eq!(
            graph.route(&breadth_first_search(&next_door).path_states()),
            "Elista -> Murom"
        );
    }

    #[test]
    fn missing_roads_cost_infinity() {
        let graph = ten_cities();
        let problem = CityProblem::from_keys(&graph, "8", "15").unwrap();
        let (irkutsk, ryazan) = (graph.find("8").unwrap(), graph.find("15").unwrap());
        assert_eq!(
            problem.action_cost(&irkutsk, &ryazan, &ryazan),
            Distance::infinity()
        );
        assert_eq!(
            problem.action_cost(&irkutsk, &graph.find("9").unwrap(), &ryazan),
            Distance::new(420.0)
        );
    }

    #[test]
    fn neighbours_follow_city_order() {
        let graph = ten_cities();
        let kazan = graph.find("9").unwrap();
        let labels: Vec<&str> = graph
            .neighbours(kazan)
            .iter()
            .map(|&(c, _)| graph.label(c))
            .collect();
        assert_eq!(labels, vec!["Belgorod", "Fryazino", "Irkutsk", "Omsk"]);
    }

    #[test]
    fn loader_errors() {
        assert!(matches!(
            CityGraph::from_json_str("[{", None),
            Err(CityGraphError::Json(_))
        ));
        assert!(matches!(
            CityGraph::load(std::path::Path::new("no/such/graph.json"), None),
            Err(CityGraphError::Io { .. })
        ));

        let twice = indoc! {r#"
            [{"data": {"id": "a", "label": "A"}},
             {"data": {"id": "a", "label": "B"}}]
        "#};
        assert!(matches!(
            CityGraph::from_json_str(twice, None),
            Err(CityGraphError::DuplicateCity(k)) if k == "a"
        ));

        let negative = indoc! {r#"
            [{"data": {"id": "a", "label": "A"}},
             {"data": {"id": "b", "label": "B"}},
             {"data": {"source": "a", "target": "b", "weight": -1}}]
        "#};
        assert!(matches!(
            CityGraph::from_json_str(negative, None),
            Err(CityGraphError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn mistyped_records_are_rejected() {
        let numeric_id = indoc! {r#"
            [{"data": {"id": "a", "label": "A"}},
             {"data": {"id": 7, "label": "C"}}]
        "#};
        assert!(matches!(
            CityGraph::from_json_str(numeric_id, None),
            Err(CityGraphError::Json(_))
        ));

        let text_weight = indoc! {r#"
            [{"data": {"id": "a", "label": "A"}},
             {"data": {"id": "b", "label": "B"}},
             {"data": {"source": "a", "target": "b", "weight": "3"}}]
        "#};
        assert!(matches!(
            CityGraph::from_json_str(text_weight, None),
            Err(CityGraphError::Json(_))
        ));
    }

    #[test]
    fn loader_skips_what_it_cannot_use() {
        let s = indoc! {r#"
            [{"data": {"id": "a", "label": "A"}},
             {"data": {"id": "b", "label": "B"}},
             {"data": {"source": "a", "target": "b", "weight": 3.5}},
             {"data": {"source": "a", "target": "z", "weight": 1}},
             {"data": {"source": "b", "target": "a"}},
             {"data": {"id": "e1", "source": "b", "target": "a", "weight": 2}},
             {"data": {"id": "c"}},
             {"group": "nodes", "data": {"note": "unused"}}]
        "#};
        let graph = CityGraph::from_json_str(s, None).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.road_count(), 1);
        let (a, b) = (graph.find("a").unwrap(), graph.find("b").unwrap());
        assert_eq!(graph.distance(a, b), Some(Distance::new(2.0)));
        assert_eq!(graph.distance(b, a), Some(Distance::new(2.0)));
        assert_eq!(graph.to_string(), "CityGraph(2 cities, 1 roads)");
    }
}
