//! Truck + UAV routing as a mixed integer program.
//!
//! Arc variables cover every ordered node pair `(i, j)` with the hub at 0:
//! `x` truck arcs, `y` UAV arcs and `load`, the demand still on board while
//! the truck drives `i -> j`. `s(i)` marks truck-served delivery nodes.
//! Decreasing `load` along every used truck arc both enforces the capacity
//! and rules out truck cycles that avoid the hub, as long as the cycle
//! carries some demand. Zero-demand cycles are cut with rank variables.

use dronevrp_structs::{plan::Plan, problem::InstanceError, problem::Problem, NodeId, HUB};
use log::trace;

use crate::decode::{Assignment, Inconsistency};
use crate::milp::{LinExpr, Model, Var};
use crate::verify::Violation;

#[derive(Clone, Copy, Debug)]
pub struct FormulationOptions {
    /// Add rank constraints over zero-demand nodes. Without them a truck
    /// cycle of three or more zero-demand nodes satisfies the load rows.
    pub break_zero_demand_subtours: bool,
}

impl Default for FormulationOptions {
    fn default() -> Self {
        Self {
            break_zero_demand_subtours: true,
        }
    }
}

pub struct Formulation {
    pub model: Model,
    n: usize,
    x: Vec<Vec<Var>>,
    y: Vec<Vec<Var>>,
    load: Vec<Vec<Var>>,
    s: Vec<Option<Var>>,
    rank: Vec<Option<Var>>,
    /// Relaxation constant of the load rows.
    pub big_m: f64,
    /// Objective weight of one dispatched truck.
    pub vehicle_weight: f64,
}

impl Formulation {
    pub fn new(problem: &Problem) -> Result<Self, InstanceError> {
        Self::with_options(problem, FormulationOptions::default())
    }

    pub fn with_options(
        problem: &Problem,
        options: FormulationOptions,
    ) -> Result<Self, InstanceError> {
        problem.validate()?;

        let n = problem.node_count;
        let capacity = problem.load_capacity;
        let factor = problem.uav_cost_factor;

        // Any right-hand side of a load or hub sortie row is at most w_j, one
        // outgoing load and two distinct sortie nodes, which never exceeds
        // total demand + capacity.
        let big_m = problem.total_demand() + capacity;
        let vehicle_weight = 1.0
            + (1.0 + factor)
                * problem
                    .distance
                    .iter()
                    .flat_map(|row| row.iter())
                    .sum::<f64>();

        let mut model = Model::new();
        let arc_vars = |model: &mut Model, prefix: &str| -> Vec<Vec<Var>> {
            problem
                .nodes()
                .map(|i| {
                    problem
                        .nodes()
                        .map(|j| model.add_binary(format!("{}[{},{}]", prefix, i, j), 0.0))
                        .collect::<Vec<_>>()
                })
                .collect()
        };
        let x = arc_vars(&mut model, "x");
        let y = arc_vars(&mut model, "y");

        let s = problem
            .nodes()
            .map(|i| (i != HUB).then(|| model.add_binary(format!("s[{}]", i), 0.0)))
            .collect::<Vec<_>>();

        let load = problem
            .nodes()
            .map(|i| {
                problem
                    .nodes()
                    .map(|j| model.add_var(format!("load[{},{}]", i, j), 0.0, 0.0, capacity))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut f = Formulation {
            model,
            n,
            x,
            y,
            load,
            s,
            rank: vec![None; n + 1],
            big_m,
            vehicle_weight,
        };

        f.set_objective(problem);
        f.add_degree_rows(problem);
        f.add_self_loop_rows();
        f.add_mode_rows(problem);
        f.add_load_rows(problem);
        f.add_sortie_rows(problem);
        f.add_single_uav_rows();
        f.add_vehicle_bound(problem);
        if options.break_zero_demand_subtours {
            f.add_zero_demand_ranks(problem);
        }

        trace!(
            "formulation: {} vars, {} rows, M={}, vehicle weight={}",
            f.model.num_vars(),
            f.model.num_rows(),
            f.big_m,
            f.vehicle_weight
        );
        Ok(f)
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn x(&self, i: NodeId, j: NodeId) -> Var {
        self.x[i][j]
    }

    pub fn y(&self, i: NodeId, j: NodeId) -> Var {
        self.y[i][j]
    }

    pub fn load(&self, i: NodeId, j: NodeId) -> Var {
        self.load[i][j]
    }

    /// `None` for the hub.
    pub fn s(&self, i: NodeId) -> Option<Var> {
        self.s[i]
    }

    /// Rank variable, present only for zero-demand nodes when ranks are on.
    pub fn rank(&self, i: NodeId) -> Option<Var> {
        self.rank[i]
    }

    fn nodes(&self) -> std::ops::RangeInclusive<NodeId> {
        HUB..=self.n
    }

    fn set_objective(&mut self, problem: &Problem) {
        for i in self.nodes() {
            for j in self.nodes() {
                let cost = problem.cost(i, j);
                self.model.add_cost(self.x[i][j], cost);
                self.model
                    .add_cost(self.y[i][j], cost * problem.uav_cost_factor);
            }
        }
        for j in problem.delivery_nodes() {
            self.model.add_cost(self.x[HUB][j], self.vehicle_weight);
        }
    }

    fn add_degree_rows(&mut self, problem: &Problem) {
        for i in problem.delivery_nodes() {
            let x_in = self.nodes().map(|j| self.x[j][i]).collect::<Vec<_>>();
            let x_out = self.nodes().map(|j| self.x[i][j]).collect::<Vec<_>>();

            if !problem.is_uav_eligible(i) {
                self.model
                    .add_eq(format!("truck_in[{}]", i), LinExpr::new().add_sum(x_in, 1.0), 1.0);
                self.model
                    .add_eq(format!("truck_out[{}]", i), LinExpr::new().add_sum(x_out, 1.0), 1.0);
            } else {
                let y_in = self.nodes().map(|j| self.y[j][i]).collect::<Vec<_>>();
                let y_out = self.nodes().map(|j| self.y[i][j]).collect::<Vec<_>>();
                self.model.add_eq(
                    format!("cover_in[{}]", i),
                    LinExpr::new().add_sum(x_in, 1.0).add_sum(y_in.iter().copied(), 1.0),
                    1.0,
                );
                self.model.add_eq(
                    format!("cover_out[{}]", i),
                    LinExpr::new().add_sum(x_out, 1.0).add_sum(y_out.iter().copied(), 1.0),
                    1.0,
                );
                // A UAV landing here must also leave from here.
                self.model.add_eq(
                    format!("uav_balance[{}]", i),
                    LinExpr::new().add_sum(y_in, 1.0).add_sum(y_out, -1.0),
                    0.0,
                );
            }
        }
    }

    fn add_self_loop_rows(&mut self) {
        let x_diag = self.nodes().map(|i| self.x[i][i]).collect::<Vec<_>>();
        let y_diag = self.nodes().map(|i| self.y[i][i]).collect::<Vec<_>>();
        self.model
            .add_eq("no_truck_loop".to_string(), LinExpr::new().add_sum(x_diag, 1.0), 0.0);
        self.model
            .add_eq("no_uav_loop".to_string(), LinExpr::new().add_sum(y_diag, 1.0), 0.0);
    }

    fn add_mode_rows(&mut self, problem: &Problem) {
        for i in problem.delivery_nodes() {
            let Some(s) = self.s[i] else { continue };
            let x_out = self.nodes().map(|j| self.x[i][j]).collect::<Vec<_>>();
            self.model.add_eq(
                format!("mode[{}]", i),
                LinExpr::new().add(s, 1.0).add_sum(x_out, -1.0),
                0.0,
            );
        }
    }

    fn add_load_rows(&mut self, problem: &Problem) {
        let m = self.big_m;
        for j in problem.delivery_nodes() {
            for i in self.nodes() {
                // load(i,j) >= w_j + sum_k load(j,k) + sum_u w_u y(j,u) - M (1 - x(i,j))
                let mut expr = LinExpr::new()
                    .add(self.load[i][j], 1.0)
                    .add(self.x[i][j], -m);
                for k in self.nodes().filter(|k| *k != j) {
                    expr = expr.add(self.load[j][k], -1.0);
                }
                for u in problem.uav_eligible.iter().filter(|u| **u != j) {
                    expr = expr.add(self.y[j][*u], -problem.weight(*u));
                }
                self.model
                    .add_ge(format!("load[{},{}]", i, j), expr, problem.weight(j) - m);

                if i != HUB && i < j {
                    self.model.add_le(
                        format!("pair[{},{}]", i, j),
                        LinExpr::new().add(self.x[i][j], 1.0).add(self.x[j][i], 1.0),
                        1.0,
                    );
                }
            }
        }

        // A sortie hub -> u -> k flies out with the truck driving hub -> k:
        // load(0,k) >= w_k + sum_l load(k,l) + sum_v w_v y(k,v)
        //              + w_u (y(0,u) + y(u,k) - 1) - M (1 - x(0,k))
        for u in problem.uav_eligible.iter().copied() {
            let w_u = problem.weight(u);
            for k in problem.delivery_nodes().filter(|k| *k != u) {
                let mut expr = LinExpr::new()
                    .add(self.load[HUB][k], 1.0)
                    .add(self.x[HUB][k], -m)
                    .add(self.y[HUB][u], -w_u)
                    .add(self.y[u][k], -w_u);
                for l in self.nodes().filter(|l| *l != k) {
                    expr = expr.add(self.load[k][l], -1.0);
                }
                for v in problem.uav_eligible.iter().filter(|v| **v != k) {
                    expr = expr.add(self.y[k][*v], -problem.weight(*v));
                }
                self.model.add_ge(
                    format!("hub_sortie[{},{}]", u, k),
                    expr,
                    problem.weight(k) - w_u - m,
                );
            }
        }

        for i in self.nodes() {
            for j in self.nodes() {
                self.model.add_le(
                    format!("load_arc[{},{}]", i, j),
                    LinExpr::new()
                        .add(self.load[i][j], 1.0)
                        .add(self.x[i][j], -problem.load_capacity),
                    0.0,
                );
            }
        }
    }

    fn add_sortie_rows(&mut self, problem: &Problem) {
        // y(i,j) + y(j,k) <= 2 x(i,k) + 1: a sortie i -> j -> k needs the
        // truck to drive i -> k directly.
        for j in problem.uav_eligible.iter().copied() {
            for i in self.nodes() {
                for k in self.nodes() {
                    self.model.add_le(
                        format!("sortie[{},{},{}]", i, j, k),
                        LinExpr::new()
                            .add(self.y[i][j], 1.0)
                            .add(self.y[j][k], 1.0)
                            .add(self.x[i][k], -2.0),
                        1.0,
                    );
                }
            }
        }
    }

    fn add_single_uav_rows(&mut self) {
        for i in self.nodes() {
            let y_out = self.nodes().map(|j| self.y[i][j]).collect::<Vec<_>>();
            let y_in = self.nodes().map(|j| self.y[j][i]).collect::<Vec<_>>();
            self.model
                .add_le(format!("uav_launch[{}]", i), LinExpr::new().add_sum(y_out, 1.0), 1.0);
            self.model
                .add_le(format!("uav_recover[{}]", i), LinExpr::new().add_sum(y_in, 1.0), 1.0);
        }
    }

    fn add_vehicle_bound(&mut self, problem: &Problem) {
        let dispatch = problem
            .delivery_nodes()
            .map(|j| self.x[HUB][j])
            .collect::<Vec<_>>();
        self.model.add_ge(
            "min_trucks".to_string(),
            LinExpr::new().add_sum(dispatch, 1.0),
            problem.min_trucks() as f64,
        );
    }

    fn add_zero_demand_ranks(&mut self, problem: &Problem) {
        let zero = problem
            .delivery_nodes()
            .filter(|i| problem.weight(*i) == 0.0)
            .collect::<Vec<_>>();
        if zero.len() < 2 {
            return;
        }

        let z = zero.len() as f64;
        for i in zero.iter().copied() {
            self.rank[i] = Some(self.model.add_var(format!("r[{}]", i), 0.0, 1.0, z));
        }
        for i in zero.iter().copied() {
            for j in zero.iter().copied().filter(|j| *j != i) {
                let (Some(ri), Some(rj)) = (self.rank[i], self.rank[j]) else {
                    continue;
                };
                // r(j) >= r(i) + 1 - Z (1 - x(i,j))
                self.model.add_ge(
                    format!("rank[{},{}]", i, j),
                    LinExpr::new()
                        .add(rj, 1.0)
                        .add(ri, -1.0)
                        .add(self.x[i][j], -z),
                    1.0 - z,
                );
            }
        }
    }

    /// Reads the engine's value vector back into arc/node form.
    pub fn assignment(&self, values: &[f64]) -> Result<Assignment, Inconsistency> {
        if values.len() != self.model.num_vars() {
            return Err(Inconsistency::ValueCount {
                expected: self.model.num_vars(),
                found: values.len(),
            });
        }
        let mut a = Assignment::new(self.n);
        for i in self.nodes() {
            for j in self.nodes() {
                a.set_x(i, j, values[self.x[i][j].idx()]);
                a.set_y(i, j, values[self.y[i][j].idx()]);
                a.set_load(i, j, values[self.load[i][j].idx()]);
            }
            if let Some(s) = self.s[i] {
                a.set_s(i, values[s.idx()]);
            }
        }
        Ok(a)
    }

    /// Variable values describing `plan`. A plan satisfying every routing
    /// invariant yields a vector the model accepts. Fails on the first node
    /// id the model has no variables for.
    pub fn encode_plan(&self, problem: &Problem, plan: &Plan) -> Result<Vec<f64>, Violation> {
        let sortie_nodes = plan
            .uav_sorties
            .iter()
            .flat_map(|(u, s)| [*u, s.launch, s.recover]);
        if let Some(node) = plan
            .routes
            .iter()
            .flatten()
            .copied()
            .chain(sortie_nodes)
            .find(|n| *n > self.n)
        {
            return Err(Violation::UnknownNode(node));
        }

        let mut values = vec![0.0; self.model.num_vars()];
        for i in problem.delivery_nodes() {
            if let Some(s) = self.s[i] {
                values[s.idx()] = if plan.uav_sorties.contains_key(&i) { 0.0 } else { 1.0 };
            }
            if let Some(r) = self.rank[i] {
                values[r.idx()] = 1.0;
            }
        }

        for (u, sortie) in plan.uav_sorties.iter() {
            values[self.y[sortie.launch][*u].idx()] = 1.0;
            values[self.y[*u][sortie.recover].idx()] = 1.0;
        }

        for route in plan.routes.iter() {
            let mut remaining = plan.route_load(problem, route);
            let mut zero_seen = 0.0;
            for (a, b) in route.iter().copied().zip(route.iter().copied().skip(1)) {
                values[self.x[a][b].idx()] = 1.0;
                values[self.load[a][b].idx()] = remaining;
                if a == HUB {
                    remaining -= plan.hub_launch_load(problem, route);
                }
                if b != HUB {
                    remaining -= plan.stop_load(problem, b);
                    if let Some(r) = self.rank[b] {
                        zero_seen += 1.0;
                        values[r.idx()] = zero_seen;
                    }
                }
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronevrp_structs::plan::{PlanStatus, UavSortie};

    const TOL: f64 = 1e-6;

    fn line_problem(demand: Vec<f64>, eligible: &[NodeId]) -> Problem {
        let n = demand.len();
        Problem {
            node_count: n,
            uav_eligible: eligible.iter().copied().collect(),
            demand,
            load_capacity: 30.0,
            distance: (0..=n)
                .map(|i| (0..=n).map(|j| (i as f64 - j as f64).abs()).collect())
                .collect(),
            uav_cost_factor: 0.5,
        }
    }

    fn plan(routes: Vec<Vec<NodeId>>, sorties: &[(NodeId, NodeId, NodeId)]) -> Plan {
        Plan {
            routes,
            uav_sorties: sorties
                .iter()
                .map(|(u, launch, recover)| {
                    (*u, UavSortie { launch: *launch, recover: *recover })
                })
                .collect(),
            status: PlanStatus::Optimal,
            objective: 0.0,
            bound: 0.0,
        }
    }

    #[test]
    fn declares_all_arc_and_mode_variables() {
        let p = line_problem(vec![5.0, 5.0, 5.0], &[2]);
        let f = Formulation::new(&p).unwrap();
        assert_eq!(f.model.num_vars(), 3 * 16 + 3);
        assert_eq!(f.model.num_binaries(), 2 * 16 + 3);
        assert!(f.s(HUB).is_none());
        assert_eq!(f.model.var_name(f.x(1, 2)), "x[1,2]");
        assert_eq!(f.model.var_name(f.load(3, 0)), "load[3,0]");
        assert!(f.model.row("cover_in[2]").is_some());
        assert!(f.model.row("truck_in[2]").is_none());
        assert!(f.model.row("truck_in[1]").is_some());
        assert!(f.model.row("sortie[0,2,3]").is_some());
        assert!(f.model.row("sortie[0,1,3]").is_none());
    }

    #[test]
    fn rejects_invalid_instance() {
        let mut p = line_problem(vec![5.0, 5.0], &[]);
        p.load_capacity = -1.0;
        assert!(matches!(
            Formulation::new(&p),
            Err(InstanceError::NonPositiveCapacity)
        ));
    }

    #[test]
    fn big_constants_follow_instance() {
        let p = line_problem(vec![5.0, 10.0], &[]);
        let f = Formulation::new(&p).unwrap();
        assert_eq!(f.big_m, 15.0 + 30.0);
        // distances 0 1 2 / 1 0 1 / 2 1 0 sum to 8
        assert_eq!(f.vehicle_weight, 1.0 + 1.5 * 8.0);
        assert_eq!(f.model.vars[f.x(HUB, 1).idx()].cost, f.vehicle_weight + 1.0);
        assert_eq!(f.model.vars[f.y(1, 2).idx()].cost, 0.5);
    }

    #[test]
    fn valid_plans_are_feasible() {
        let p = line_problem(vec![10.0, 5.0, 5.0, 10.0], &[3]);
        let f = Formulation::new(&p).unwrap();
        let pl = plan(vec![vec![0, 1, 2, 4, 0]], &[(3, 2, 4)]);
        let values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(f.model.violations(&values, TOL), Vec::<String>::new());

        let expected = f.vehicle_weight + pl.total_distance(&p);
        assert!((f.model.objective_value(&values) - expected).abs() < TOL);
    }

    #[test]
    fn capacity_includes_launched_sorties() {
        let p = line_problem(vec![10.0, 10.0, 5.0, 10.0], &[3]);
        let f = Formulation::new(&p).unwrap();
        // 35 on one truck
        let pl = plan(vec![vec![0, 1, 2, 4, 0]], &[(3, 2, 4)]);
        let mut values = f.encode_plan(&p, &pl).unwrap();
        values[f.load(HUB, 1).idx()] = 30.0;
        assert!(!f.model.violations(&values, TOL).is_empty());

        let pl = plan(vec![vec![0, 1, 0], vec![0, 2, 4, 0]], &[(3, 2, 4)]);
        let values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(f.model.violations(&values, TOL), Vec::<String>::new());
    }

    #[test]
    fn hub_sortie_loads_the_bridged_truck_arc() {
        let mut p = line_problem(vec![11.0, 0.0, 0.0], &[1]);
        p.load_capacity = 10.0;
        let f = Formulation::new(&p).unwrap();
        assert!(f.model.row("hub_sortie[1,2]").is_some());
        assert!(f.model.row("hub_sortie[1,1]").is_none());

        let pl = plan(vec![vec![0, 2, 0], vec![0, 3, 0]], &[(1, 0, 2)]);
        let mut values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(values[f.load(HUB, 2).idx()], 11.0);
        assert_eq!(
            f.model.violations(&values, TOL),
            vec!["bounds of load[0,2]", "load_arc[0,2]"]
        );

        values[f.load(HUB, 2).idx()] = 0.0;
        assert_eq!(f.model.violations(&values, TOL), vec!["hub_sortie[1,2]"]);

        let mut p = line_problem(vec![8.0, 0.0, 0.0], &[1]);
        p.load_capacity = 10.0;
        let f = Formulation::new(&p).unwrap();
        let values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(f.model.violations(&values, TOL), Vec::<String>::new());
    }

    #[test]
    fn encode_rejects_unknown_nodes() {
        let p = line_problem(vec![5.0, 5.0], &[2]);
        let f = Formulation::new(&p).unwrap();
        let pl = plan(vec![vec![0, 1, 3, 0]], &[]);
        assert_eq!(f.encode_plan(&p, &pl), Err(Violation::UnknownNode(3)));

        let pl = plan(vec![vec![0, 1, 0]], &[(2, 1, 4)]);
        assert_eq!(f.encode_plan(&p, &pl), Err(Violation::UnknownNode(4)));
    }

    #[test]
    fn sortie_must_bridge_a_truck_arc() {
        let p = line_problem(vec![10.0, 5.0], &[2]);
        let f = Formulation::new(&p).unwrap();
        let pl = plan(vec![vec![0, 1, 0]], &[(2, 0, 0)]);
        let values = f.encode_plan(&p, &pl).unwrap();
        let violated = f.model.violations(&values, TOL);
        assert!(violated.contains(&"sortie[0,2,0]".to_string()));

        let pl = plan(vec![vec![0, 1, 0]], &[(2, 1, 0)]);
        let values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(f.model.violations(&values, TOL), Vec::<String>::new());
    }

    #[test]
    fn loaded_subtour_violates_load_rows() {
        let p = line_problem(vec![10.0, 5.0, 5.0, 5.0], &[]);
        let f = Formulation::new(&p).unwrap();
        let mut values = f.encode_plan(&p, &plan(vec![vec![0, 1, 0]], &[])).unwrap();
        for (a, b) in [(2, 3), (3, 4), (4, 2)] {
            values[f.x(a, b).idx()] = 1.0;
        }
        for i in 2..=4 {
            values[f.s(i).unwrap().idx()] = 1.0;
        }
        let violated = f.model.violations(&values, TOL);
        assert!(violated.iter().any(|r| r.starts_with("load[")));
    }

    fn zero_demand_subtour(options: FormulationOptions) -> Vec<String> {
        let p = line_problem(vec![10.0, 0.0, 0.0, 0.0], &[]);
        let f = Formulation::with_options(&p, options).unwrap();
        let mut values = f.encode_plan(&p, &plan(vec![vec![0, 1, 0]], &[])).unwrap();
        for (a, b) in [(2, 3), (3, 4), (4, 2)] {
            values[f.x(a, b).idx()] = 1.0;
        }
        for i in 2..=4 {
            values[f.s(i).unwrap().idx()] = 1.0;
        }
        f.model.violations(&values, TOL)
    }

    #[test]
    fn zero_demand_subtour_needs_ranks() {
        let without = zero_demand_subtour(FormulationOptions {
            break_zero_demand_subtours: false,
        });
        assert_eq!(without, Vec::<String>::new());

        let with = zero_demand_subtour(FormulationOptions::default());
        assert!(!with.is_empty());
        assert!(with.iter().all(|r| r.starts_with("rank[")));
    }

    #[test]
    fn zero_demand_pair_is_cut_without_ranks() {
        let p = line_problem(vec![10.0, 0.0, 0.0], &[]);
        let f = Formulation::with_options(
            &p,
            FormulationOptions {
                break_zero_demand_subtours: false,
            },
        )
        .unwrap();
        let mut values = f.encode_plan(&p, &plan(vec![vec![0, 1, 0]], &[])).unwrap();
        values[f.x(2, 3).idx()] = 1.0;
        values[f.x(3, 2).idx()] = 1.0;
        values[f.s(2).unwrap().idx()] = 1.0;
        values[f.s(3).unwrap().idx()] = 1.0;
        assert_eq!(f.model.violations(&values, TOL), vec!["pair[2,3]"]);
    }

    #[test]
    fn zero_demand_routes_stay_feasible_with_ranks() {
        let p = line_problem(vec![0.0, 0.0, 0.0, 10.0], &[2]);
        let f = Formulation::new(&p).unwrap();
        assert!(f.rank(1).is_some() && f.rank(4).is_none());
        let pl = plan(vec![vec![0, 1, 3, 4, 0]], &[(2, 1, 3)]);
        let values = f.encode_plan(&p, &pl).unwrap();
        assert_eq!(f.model.violations(&values, TOL), Vec::<String>::new());
    }

    #[test]
    fn vehicle_bound_counts_dispatches() {
        let p = line_problem(vec![20.0, 20.0], &[]);
        let f = Formulation::new(&p).unwrap();
        let row = f.model.row("min_trucks").unwrap();
        assert_eq!(row.lb, 2.0);
        assert_eq!(row.idxs, vec![f.x(HUB, 1), f.x(HUB, 2)]);
    }

    #[test]
    fn assignment_checks_value_count() {
        let p = line_problem(vec![5.0], &[]);
        let f = Formulation::new(&p).unwrap();
        assert_eq!(
            f.assignment(&[0.0; 3]).err(),
            Some(Inconsistency::ValueCount {
                expected: f.model.num_vars(),
                found: 3
            })
        );
    }
}
