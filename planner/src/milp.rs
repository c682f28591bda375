//! Solver-independent mixed integer linear program.
//!
//! The formulation writes into a [`Model`]; engine backends copy it into
//! their native representation. Keeping the model declarative lets tests
//! check candidate assignments against it without running an engine.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub u32);

impl Var {
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub struct VarDef {
    pub name: String,
    pub cost: f64,
    pub lb: f64,
    pub ub: f64,
    pub binary: bool,
}

/// `lb <= sum(coeffs[k] * idxs[k]) <= ub`, infinite sides allowed.
#[derive(Clone, Debug)]
pub struct Row {
    pub name: String,
    pub lb: f64,
    pub ub: f64,
    pub idxs: Vec<Var>,
    pub coeffs: Vec<f64>,
}

impl Row {
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.idxs
            .iter()
            .zip(self.coeffs.iter())
            .map(|(v, c)| c * values[v.idx()])
            .sum()
    }
}

/// Linear expression builder. Repeated variables are merged when the row is
/// added to the model.
#[derive(Clone, Debug, Default)]
pub struct LinExpr {
    terms: Vec<(Var, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, var: Var, coeff: f64) -> Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn add_sum(mut self, vars: impl IntoIterator<Item = Var>, coeff: f64) -> Self {
        self.terms.extend(vars.into_iter().map(|v| (v, coeff)));
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Model {
    pub vars: Vec<VarDef>,
    pub rows: Vec<Row>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name: String, cost: f64, lb: f64, ub: f64) -> Var {
        let var = Var(self.vars.len() as u32);
        self.vars.push(VarDef {
            name,
            cost,
            lb,
            ub,
            binary: false,
        });
        var
    }

    pub fn add_binary(&mut self, name: String, cost: f64) -> Var {
        let var = self.add_var(name, cost, 0.0, 1.0);
        self.vars[var.idx()].binary = true;
        var
    }

    pub fn add_cost(&mut self, var: Var, cost: f64) {
        self.vars[var.idx()].cost += cost;
    }

    pub fn add_row(&mut self, name: String, lb: f64, ub: f64, expr: LinExpr) {
        let mut merged: BTreeMap<Var, f64> = BTreeMap::new();
        for (var, coeff) in expr.terms {
            *merged.entry(var).or_default() += coeff;
        }
        let (idxs, coeffs) = merged.into_iter().filter(|(_, c)| *c != 0.0).unzip();
        self.rows.push(Row {
            name,
            lb,
            ub,
            idxs,
            coeffs,
        });
    }

    pub fn add_eq(&mut self, name: String, expr: LinExpr, rhs: f64) {
        self.add_row(name, rhs, rhs, expr);
    }

    pub fn add_le(&mut self, name: String, expr: LinExpr, rhs: f64) {
        self.add_row(name, f64::NEG_INFINITY, rhs, expr);
    }

    pub fn add_ge(&mut self, name: String, expr: LinExpr, rhs: f64) {
        self.add_row(name, rhs, f64::INFINITY, expr);
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.vars.iter().filter(|v| v.binary).count()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn var_name(&self, var: Var) -> &str {
        &self.vars[var.idx()].name
    }

    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.vars.iter().zip(values.iter()).map(|(v, x)| v.cost * x).sum()
    }

    /// Names of the bounds, integrality requirements and rows that `values`
    /// violates by more than `tol`. A vector of the wrong length is reported
    /// as a single entry.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<String> {
        if values.len() != self.vars.len() {
            return vec![format!(
                "value count {}, expected {}",
                values.len(),
                self.vars.len()
            )];
        }
        let mut out = Vec::new();
        for (def, x) in self.vars.iter().zip(values.iter()) {
            if *x < def.lb - tol || *x > def.ub + tol {
                out.push(format!("bounds of {}", def.name));
            }
            if def.binary && (x - x.round()).abs() > tol {
                out.push(format!("integrality of {}", def.name));
            }
        }
        for row in self.rows.iter() {
            let a = row.activity(values);
            if a < row.lb - tol || a > row.ub + tol {
                out.push(row.name.clone());
            }
        }
        out
    }
}
