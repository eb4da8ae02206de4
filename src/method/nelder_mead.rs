//! Derivative-free simplex search.

use super::{Method, Needs, SerialLink, Task, TaskReceiver, TaskSender};
use crate::location::Location;
use crate::types::{Eval, Operation};

/// The Nelder-Mead downhill-simplex method.
///
/// Maintains `dim + 1` vertices and improves the worst one each iteration
/// through reflection, expansion, contraction, and shrink steps. No
/// derivatives are used, so termination is left entirely to the driver —
/// with default settings the stagnation monitor
/// ([`FunctionConverge`](crate::FunctionConverge)) ends the run.
///
/// This is the default method for problems without a gradient.
#[derive(Clone, Debug)]
pub struct NelderMead {
    /// Reflection coefficient.
    pub reflection: f64,
    /// Expansion coefficient.
    pub expansion: f64,
    /// Contraction coefficient.
    pub contraction: f64,
    /// Shrink coefficient.
    pub shrink: f64,

    dim: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            dim: 0,
        }
    }
}

/// Evaluate the objective at `x`, reusing `task` as the vehicle.
fn probe(link: &mut SerialLink, mut task: Task, x: &[f64]) -> Option<Task> {
    task.location.x.copy_from_slice(x);
    task.op = Operation::Evaluate(Eval::FUNC);
    link.exchange(task)
}

impl Method for NelderMead {
    fn needs(&self) -> Needs {
        Needs::default()
    }

    fn init(&mut self, dim: usize, _tasks: usize) -> usize {
        self.dim = dim;
        1
    }

    #[allow(clippy::too_many_lines)]
    fn run(&mut self, operations: TaskSender, results: TaskReceiver, mut tasks: Vec<Task>) {
        let mut link = SerialLink::new(operations, results);
        let dim = self.dim;
        let mut task = tasks.swap_remove(0);

        // Track the best point over every probe so a final commit can be
        // made if termination interrupts an iteration.
        let mut best_seen = (f64::INFINITY, task.location.x.clone());
        let mut last_committed = f64::INFINITY;

        let finish = |link: SerialLink, best_seen: (f64, Vec<f64>), last_committed: f64| {
            let commit = (best_seen.0 < last_committed).then(|| Location {
                x: best_seen.1,
                f: best_seen.0,
                ..Location::default()
            });
            link.finish(commit);
        };

        let have = match task.op {
            Operation::Evaluate(mask) => mask,
            _ => Eval::empty(),
        };
        if !have.contains(Eval::FUNC) {
            task.op = Operation::Evaluate(Eval::FUNC);
            task = match link.exchange(task) {
                Some(task) => task,
                None => return finish(link, best_seen, last_committed),
            };
        }
        best_seen = (task.location.f, task.location.x.clone());
        if link.stopping() {
            return finish(link, best_seen, last_committed);
        }

        // Seed the simplex from the starting point.
        let mut vertices = vec![task.location.x.clone()];
        let mut values = vec![task.location.f];
        for i in 0..dim {
            let mut v = vertices[0].clone();
            v[i] += if v[i] != 0.0 { 0.05 * v[i] } else { 0.000_25 };
            task = match probe(&mut link, task, &v) {
                Some(task) => task,
                None => return finish(link, best_seen, last_committed),
            };
            if task.location.f < best_seen.0 {
                best_seen = (task.location.f, v.clone());
            }
            vertices.push(v);
            values.push(task.location.f);
            if link.stopping() {
                return finish(link, best_seen, last_committed);
            }
        }

        loop {
            // Order the simplex, best first.
            let mut order: Vec<usize> = (0..=dim).collect();
            order.sort_by(|&a, &b| {
                values[a]
                    .partial_cmp(&values[b])
                    .unwrap_or(core::cmp::Ordering::Equal)
            });
            vertices = order.iter().map(|&i| vertices[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            // Commit the current best as a major iteration.
            task.location.x.copy_from_slice(&vertices[0]);
            task.location.f = values[0];
            task.op = Operation::MajorIteration;
            task = match link.exchange(task) {
                Some(task) => task,
                None => return finish(link, best_seen, last_committed),
            };
            last_committed = values[0];
            if link.stopping() {
                break;
            }

            // Centroid of every vertex but the worst.
            let mut centroid = vec![0.0; dim];
            for v in &vertices[..dim] {
                for (c, vi) in centroid.iter_mut().zip(v) {
                    *c += vi;
                }
            }
            for c in &mut centroid {
                *c /= dim as f64;
            }

            let f_best = values[0];
            let f_second = values[dim - 1];
            let f_worst = values[dim];

            let reflected: Vec<f64> = centroid
                .iter()
                .zip(&vertices[dim])
                .map(|(c, w)| c + self.reflection * (c - w))
                .collect();
            task = match probe(&mut link, task, &reflected) {
                Some(task) => task,
                None => return finish(link, best_seen, last_committed),
            };
            let f_reflected = task.location.f;
            if f_reflected < best_seen.0 {
                best_seen = (f_reflected, reflected.clone());
            }
            if link.stopping() {
                break;
            }

            if f_reflected < f_best {
                // The reflection is the new best; try going further.
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(&vertices[dim])
                    .map(|(c, w)| c + self.expansion * (c - w))
                    .collect();
                task = match probe(&mut link, task, &expanded) {
                    Some(task) => task,
                    None => return finish(link, best_seen, last_committed),
                };
                let f_expanded = task.location.f;
                if f_expanded < best_seen.0 {
                    best_seen = (f_expanded, expanded.clone());
                }
                if f_expanded < f_reflected {
                    vertices[dim] = expanded;
                    values[dim] = f_expanded;
                } else {
                    vertices[dim] = reflected;
                    values[dim] = f_reflected;
                }
                if link.stopping() {
                    break;
                }
            } else if f_reflected < f_second {
                vertices[dim] = reflected;
                values[dim] = f_reflected;
            } else {
                // Contract toward the better of the reflection and the worst
                // vertex; shrink the whole simplex if even that fails.
                let toward = if f_reflected < f_worst {
                    &reflected
                } else {
                    &vertices[dim]
                };
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(toward)
                    .map(|(c, t)| c + self.contraction * (t - c))
                    .collect();
                task = match probe(&mut link, task, &contracted) {
                    Some(task) => task,
                    None => return finish(link, best_seen, last_committed),
                };
                let f_contracted = task.location.f;
                if f_contracted < best_seen.0 {
                    best_seen = (f_contracted, contracted.clone());
                }
                if link.stopping() {
                    break;
                }

                if f_contracted < f_reflected.min(f_worst) {
                    vertices[dim] = contracted;
                    values[dim] = f_contracted;
                } else {
                    for j in 1..=dim {
                        let shrunk: Vec<f64> = vertices[0]
                            .iter()
                            .zip(&vertices[j])
                            .map(|(b, v)| b + self.shrink * (v - b))
                            .collect();
                        task = match probe(&mut link, task, &shrunk) {
                            Some(task) => task,
                            None => return finish(link, best_seen, last_committed),
                        };
                        if task.location.f < best_seen.0 {
                            best_seen = (task.location.f, shrunk.clone());
                        }
                        vertices[j] = shrunk;
                        values[j] = task.location.f;
                        if link.stopping() {
                            break;
                        }
                    }
                    if link.stopping() {
                        break;
                    }
                }
            }
        }
        finish(link, best_seen, last_committed);
    }
}
