//! Replay of recorded intrinsic call traces
//!
//! A script is a JSON list of steps. Qubits and results are bound to names so
//! later steps can refer to them, e.g.
//!
//! ```json
//! {"steps": [
//!   {"op": "allocate", "qubit": "q"},
//!   {"op": "measure", "qubit": "q", "result": "r"},
//!   {"op": "update_ref", "result": "r", "delta": -1}
//! ]}
//! ```

use crate::backend::Backend;
use crate::context::{ContextOptions, ExecutionContext, TeardownReport};
use crate::error::{Error, Result};
use crate::handle::{OutcomeHandle, QubitHandle};
use crate::tracker::RefCountUpdate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One recorded intrinsic call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Allocate { qubit: String },
    Borrow { qubit: String },
    Release { qubit: String },
    Return { qubit: String },
    X { qubit: String },
    Measure { qubit: String, result: String },
    Zero { result: String },
    One { result: String },
    UpdateRef { result: String, delta: i32 },
    Equal { left: String, right: String },
    ResultToString { result: String },
    QubitToString { qubit: String },
    AreaStart,
    SegmentNext,
    AreaEnd,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ScriptParse {
            message: e.to_string(),
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    /// Text produced by the query steps, in order
    pub output: Vec<String>,
    /// Results released through reference counting
    pub releases: usize,
    pub teardown: TeardownReport,
}

/// Executes a script against an execution context
pub struct Replayer<'a> {
    context: &'a mut ExecutionContext,
    qubits: HashMap<String, QubitHandle>,
    results: HashMap<String, OutcomeHandle>,
    output: Vec<String>,
    releases: usize,
}

impl<'a> Replayer<'a> {
    pub fn new(context: &'a mut ExecutionContext) -> Self {
        Self {
            context,
            qubits: HashMap::new(),
            results: HashMap::new(),
            output: Vec::new(),
            releases: 0,
        }
    }

    /// Run every step, stopping at the first failure
    pub fn run(&mut self, script: &Script) -> Result<()> {
        for (index, step) in script.steps.iter().enumerate() {
            log::trace!("step {}: {:?}", index, step);
            self.step(step).map_err(|e| match e {
                Error::Script { .. } => e,
                other => Error::script(index, other.to_string()),
            })?;
        }
        Ok(())
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn releases(&self) -> usize {
        self.releases
    }

    fn qubit(&self, name: &str) -> Result<QubitHandle> {
        self.qubits
            .get(name)
            .copied()
            .ok_or_else(|| Error::backend(format!("unbound qubit '{}'", name)))
    }

    fn result(&self, name: &str) -> Result<OutcomeHandle> {
        self.results
            .get(name)
            .copied()
            .ok_or_else(|| Error::backend(format!("unbound result '{}'", name)))
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Allocate { qubit } => {
                let handle = self.context.qubit_allocate()?;
                self.qubits.insert(qubit.clone(), handle);
            }
            Step::Borrow { qubit } => {
                let handle = self.context.qubit_borrow()?;
                self.qubits.insert(qubit.clone(), handle);
            }
            Step::Release { qubit } => {
                let handle = self.qubit(qubit)?;
                self.context.qubit_release(handle)?;
                self.qubits.remove(qubit);
            }
            Step::Return { qubit } => {
                let handle = self.qubit(qubit)?;
                self.context.qubit_return(handle)?;
                self.qubits.remove(qubit);
            }
            Step::X { qubit } => {
                let handle = self.qubit(qubit)?;
                self.gates()?.x(handle)?;
            }
            Step::Measure { qubit, result } => {
                let handle = self.qubit(qubit)?;
                let measured = self.gates()?.measure(handle)?;
                self.results.insert(result.clone(), measured);
            }
            Step::Zero { result } => {
                let handle = self.context.result_get_zero();
                self.results.insert(result.clone(), handle);
            }
            Step::One { result } => {
                let handle = self.context.result_get_one();
                self.results.insert(result.clone(), handle);
            }
            Step::UpdateRef { result, delta } => {
                let handle = self.result(result)?;
                let update = self.context.result_update_reference_count(handle, *delta)?;
                if update == RefCountUpdate::Released {
                    self.releases += 1;
                }
            }
            Step::Equal { left, right } => {
                let equal = self
                    .context
                    .result_equal(self.result(left)?, self.result(right)?);
                self.output.push(format!("{} == {}: {}", left, right, equal));
            }
            Step::ResultToString { result } => {
                let text = self.context.result_to_string(self.result(result)?)?;
                self.output.push(format!("{}: {}", result, text));
            }
            Step::QubitToString { qubit } => {
                let text = self.context.qubit_to_string(self.qubit(qubit)?);
                self.output.push(format!("{}: {}", qubit, text));
            }
            Step::AreaStart => self.context.restricted_reuse_area_start()?,
            Step::SegmentNext => self.context.restricted_reuse_segment_next()?,
            Step::AreaEnd => self.context.restricted_reuse_area_end()?,
        }
        Ok(())
    }

    fn gates(&mut self) -> Result<&mut dyn crate::backend::QuantumGateSet> {
        let name = self.context.backend().name().to_string();
        self.context
            .gate_set()
            .ok_or_else(|| Error::backend(format!("backend {} has no gate set", name)))
    }
}

/// Replay `script` on a fresh context over `backend` and tear it down
pub fn replay(
    script: &Script,
    backend: Box<dyn Backend>,
    options: ContextOptions,
) -> Result<ReplayReport> {
    let mut context = ExecutionContext::new(backend, options);
    let mut replayer = Replayer::new(&mut context);
    replayer.run(script)?;
    let output = std::mem::take(&mut replayer.output);
    let releases = replayer.releases;

    let teardown = context.teardown();
    Ok(ReplayReport {
        steps: script.steps.len(),
        output,
        releases,
        teardown,
    })
}
