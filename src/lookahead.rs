//! Distance matrix generation (C1) and lookahead reduction (C2), spec §3/§4.3.

use rand::Rng;

use crate::config::SimConfig;

/// Symmetric airport-to-airport distance matrix with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    num_airports: u32,
    data: Vec<i64>,
}

impl DistanceMatrix {
    /// Draws each unordered pair `(a, b)`, `a < b`, once from `rng`, uniform
    /// on `[distance_min, distance_max]`, and mirrors it. The original
    /// Python averages two overlapping draws via `d - triu(d) + transpose`,
    /// which does not actually yield a uniform distribution on that range;
    /// this generates the symmetric matrix directly instead (see
    /// DESIGN.md's Open Question section).
    pub fn generate(config: &SimConfig, rng: &mut impl Rng) -> Self {
        let n = config.num_airports as usize;
        let mut data = vec![0i64; n * n];
        for a in 0..n {
            for b in (a + 1)..n {
                let d = rng.gen_range(config.distance_min..=config.distance_max);
                data[a * n + b] = d;
                data[b * n + a] = d;
            }
        }
        DistanceMatrix { num_airports: config.num_airports, data }
    }

    pub fn num_airports(&self) -> u32 {
        self.num_airports
    }

    pub fn get(&self, a: u32, b: u32) -> i64 {
        self.data[a as usize * self.num_airports as usize + b as usize]
    }
}

/// `N_LP x N_LP` matrix of minimum inter-LP travel times (spec §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookaheadMatrix {
    n_lp: u32,
    data: Vec<i64>,
}

impl LookaheadMatrix {
    pub fn from_distance(distances: &DistanceMatrix, config: &SimConfig, n_lp: u32) -> Self {
        let mut data = vec![i64::MAX; (n_lp * n_lp) as usize];
        let num_airports = distances.num_airports();
        for a in 0..num_airports {
            for b in 0..num_airports {
                let pa = config.owner(a, n_lp);
                let pb = config.owner(b, n_lp);
                if pa == pb {
                    continue;
                }
                let d = distances.get(a, b);
                let idx = (pa * n_lp + pb) as usize;
                if d < data[idx] {
                    data[idx] = d;
                }
            }
        }
        LookaheadMatrix { n_lp, data }
    }

    pub fn get(&self, p: u32, q: u32) -> i64 {
        self.data[(p * self.n_lp + q) as usize]
    }
}
