//! Multi-class decomposition into binary subproblems
//!
//! A K-class training set is split either into K one-vs-all subproblems or
//! into K·(K-1)/2 pairwise subproblems. Class ids are remapped to dense
//! internal ids `0..K` in ascending external-id order.

use crate::core::{Decomposition, Result, SVMError};
use crate::kernel::KernelRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bijection between external class ids and internal ids `0..K`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct IdMap {
    external: Vec<i32>,
}

impl IdMap {
    /// Collect the distinct labels, internal id = rank in ascending order
    pub fn from_labels(labels: &[i32]) -> Self {
        let mut external = labels.to_vec();
        external.sort_unstable();
        external.dedup();
        Self { external }
    }

    /// Rebuild a map from its external ids, which must be strictly ascending
    pub fn from_external(external: Vec<i32>) -> Result<Self> {
        if external.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SVMError::InvalidParameter(format!(
                "class ids must be unique and ascending, got {external:?}"
            )));
        }
        Ok(Self { external })
    }

    pub fn len(&self) -> usize {
        self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.external.is_empty()
    }

    /// Internal id of an external class id
    pub fn internal(&self, external: i32) -> Option<usize> {
        self.external.binary_search(&external).ok()
    }

    /// External id of an internal class id
    pub fn external(&self, internal: usize) -> Option<i32> {
        self.external.get(internal).copied()
    }

    /// External ids in internal-id order
    pub fn external_ids(&self) -> &[i32] {
        &self.external
    }
}

impl TryFrom<Vec<i32>> for IdMap {
    type Error = SVMError;

    fn try_from(external: Vec<i32>) -> Result<Self> {
        Self::from_external(external)
    }
}

impl From<IdMap> for Vec<i32> {
    fn from(map: IdMap) -> Self {
        map.external
    }
}

/// One binary problem: a row subset of the training set with ±1 targets
#[derive(Debug, Clone, PartialEq)]
pub struct BinarySubproblem {
    /// Internal id of the class with target +1
    pub positive: usize,
    /// Internal id of the class with target -1; `None` for "all other classes"
    pub negative: Option<usize>,
    /// Indices into the training set
    pub rows: Vec<usize>,
    /// +1.0 or -1.0, aligned with `rows`
    pub targets: Vec<f64>,
}

impl BinarySubproblem {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Number of binary machines needed for `n_classes` classes
pub fn machine_count(decomposition: Decomposition, n_classes: usize) -> usize {
    match decomposition {
        Decomposition::OneVsAll => n_classes,
        Decomposition::Pairwise => n_classes * n_classes.saturating_sub(1) / 2,
    }
}

/// Splits a label vector into binary subproblems
#[derive(Debug, Clone)]
pub struct ClassPartitioner<'a> {
    labels: &'a [i32],
    ids: IdMap,
    /// Internal class id of every row
    internal: Vec<usize>,
}

impl<'a> ClassPartitioner<'a> {
    /// Build the id map and check that every class can be trained
    ///
    /// Fails with `InvalidParameter` for fewer than two classes and with
    /// `InsufficientExamples` for a class with fewer than two rows.
    pub fn new(labels: &'a [i32]) -> Result<Self> {
        if labels.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let ids = IdMap::from_labels(labels);
        if ids.len() < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "at least two classes are required, found {}",
                ids.len()
            )));
        }

        let mut counts = vec![0usize; ids.len()];
        let mut internal = Vec::with_capacity(labels.len());
        for &label in labels {
            // every label is in the map it was built from
            let id = ids.internal(label).unwrap_or_default();
            counts[id] += 1;
            internal.push(id);
        }

        for (id, &count) in counts.iter().enumerate() {
            if count < 2 {
                return Err(SVMError::InsufficientExamples {
                    class: ids.external_ids()[id],
                    count,
                });
            }
        }

        Ok(Self {
            labels,
            ids,
            internal,
        })
    }

    pub fn id_map(&self) -> &IdMap {
        &self.ids
    }

    pub fn n_classes(&self) -> usize {
        self.ids.len()
    }

    /// One subproblem per class, each over every row
    pub fn one_vs_all(&self) -> Vec<BinarySubproblem> {
        let all_rows: Vec<usize> = (0..self.labels.len()).collect();
        (0..self.n_classes())
            .map(|class| BinarySubproblem {
                positive: class,
                negative: None,
                rows: all_rows.clone(),
                targets: self
                    .internal
                    .iter()
                    .map(|&id| if id == class { 1.0 } else { -1.0 })
                    .collect(),
            })
            .collect()
    }

    /// One subproblem per class pair (c1 < c2), over the rows of both classes
    pub fn pairwise(&self) -> Vec<BinarySubproblem> {
        let k = self.n_classes();
        let mut subproblems = Vec::with_capacity(machine_count(Decomposition::Pairwise, k));

        for c1 in 0..k {
            for c2 in (c1 + 1)..k {
                let mut rows = Vec::new();
                let mut targets = Vec::new();
                for (row, &id) in self.internal.iter().enumerate() {
                    if id == c1 {
                        rows.push(row);
                        targets.push(1.0);
                    } else if id == c2 {
                        rows.push(row);
                        targets.push(-1.0);
                    }
                }
                subproblems.push(BinarySubproblem {
                    positive: c1,
                    negative: Some(c2),
                    rows,
                    targets,
                });
            }
        }

        subproblems
    }

    pub fn partition(&self, decomposition: Decomposition) -> Vec<BinarySubproblem> {
        match decomposition {
            Decomposition::OneVsAll => self.one_vs_all(),
            Decomposition::Pairwise => self.pairwise(),
        }
    }
}

/// Which kernel each binary machine uses
#[derive(Debug, Clone)]
pub enum KernelAssignment<'k> {
    /// One kernel for every machine
    Shared(KernelRef<'k>),
    /// One kernel per external class id (one-vs-all only)
    PerClass(BTreeMap<i32, KernelRef<'k>>),
    /// One kernel per external class pair, in either order (pairwise only)
    PerPair(BTreeMap<(i32, i32), KernelRef<'k>>),
}

/// Kernels of a model and the kernel slot of every machine
#[derive(Debug, Clone)]
pub struct ResolvedKernels<'k> {
    pub kernels: Vec<KernelRef<'k>>,
    pub slots: Vec<usize>,
}

impl<'k> KernelAssignment<'k> {
    /// Map every subproblem to a kernel slot
    pub fn resolve(
        &self,
        ids: &IdMap,
        decomposition: Decomposition,
        subproblems: &[BinarySubproblem],
    ) -> Result<ResolvedKernels<'k>> {
        match (self, decomposition) {
            (KernelAssignment::Shared(kernel), _) => Ok(ResolvedKernels {
                kernels: vec![kernel.clone()],
                slots: vec![0; subproblems.len()],
            }),
            (KernelAssignment::PerClass(map), Decomposition::OneVsAll) => {
                check_known(map.keys().copied(), ids)?;
                let mut kernels = Vec::with_capacity(subproblems.len());
                for sub in subproblems {
                    let class = external_of(ids, sub.positive)?;
                    let kernel = map.get(&class).ok_or_else(|| {
                        SVMError::InvalidParameter(format!("no kernel given for class {class}"))
                    })?;
                    kernels.push(kernel.clone());
                }
                Ok(ResolvedKernels {
                    slots: (0..kernels.len()).collect(),
                    kernels,
                })
            }
            (KernelAssignment::PerPair(map), Decomposition::Pairwise) => {
                check_known(map.keys().flat_map(|&(a, b)| [a, b]), ids)?;
                let mut kernels = Vec::with_capacity(subproblems.len());
                for sub in subproblems {
                    let c1 = external_of(ids, sub.positive)?;
                    let negative = sub.negative.ok_or_else(|| {
                        SVMError::InvalidParameter(
                            "pairwise kernels need pairwise subproblems".to_string(),
                        )
                    })?;
                    let c2 = external_of(ids, negative)?;
                    let kernel = map.get(&(c1, c2)).or_else(|| map.get(&(c2, c1))).ok_or_else(
                        || {
                            SVMError::InvalidParameter(format!(
                                "no kernel given for class pair ({c1}, {c2})"
                            ))
                        },
                    )?;
                    kernels.push(kernel.clone());
                }
                Ok(ResolvedKernels {
                    slots: (0..kernels.len()).collect(),
                    kernels,
                })
            }
            (KernelAssignment::PerClass(_), Decomposition::Pairwise) => {
                Err(SVMError::InvalidParameter(
                    "per-class kernels require one-vs-all decomposition".to_string(),
                ))
            }
            (KernelAssignment::PerPair(_), Decomposition::OneVsAll) => {
                Err(SVMError::InvalidParameter(
                    "per-pair kernels require pairwise decomposition".to_string(),
                ))
            }
        }
    }
}

fn external_of(ids: &IdMap, internal: usize) -> Result<i32> {
    ids.external(internal).ok_or_else(|| {
        SVMError::InvalidParameter(format!("internal class id {internal} out of range"))
    })
}

fn check_known<I: IntoIterator<Item = i32>>(classes: I, ids: &IdMap) -> Result<()> {
    for class in classes {
        if ids.internal(class).is_none() {
            return Err(SVMError::InvalidParameter(format!(
                "kernel given for unknown class {class}"
            )));
        }
    }
    Ok(())
}
