//! Pairwise contact response and wall integration.
//!
//! Detection is read-only: [`detect_cell`] returns the [`Contact`]s owned by
//! one cell, computed from the positions and velocities at the start of the
//! tick. [`apply_contacts`] then folds them into the particles serially, so
//! the parallel phase never writes shared state.

use crate::core::bounds::Bounds;
use crate::core::grid::SpatialGrid;
use crate::core::particle::{dot, Particle, DIM};

/// Response for one overlapping pair `(i, j)`.
///
/// `dv` is subtracted from `v_i` and added to `v_j`; `dr` is added to `r_i`
/// and subtracted from `r_j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub i: usize,
    pub j: usize,
    pub dv: [f64; DIM],
    pub dr: [f64; DIM],
}

/// Equal-mass elastic exchange along unit normal `n`.
///
/// The normal component of the relative velocity moves from one particle to
/// the other; tangential components are untouched.
#[inline]
pub fn elastic_exchange(vi: [f64; DIM], vj: [f64; DIM], n: [f64; DIM]) -> ([f64; DIM], [f64; DIM]) {
    let dv = normal_transfer(&vi, &vj, &n);
    let mut out_i = vi;
    let mut out_j = vj;
    for k in 0..DIM {
        out_i[k] -= dv[k];
        out_j[k] += dv[k];
    }
    (out_i, out_j)
}

#[inline]
fn normal_transfer(vi: &[f64; DIM], vj: &[f64; DIM], n: &[f64; DIM]) -> [f64; DIM] {
    let mut rel = [0.0_f64; DIM];
    for k in 0..DIM {
        rel[k] = vi[k] - vj[k];
    }
    let along = dot(&rel, n);
    let mut dv = [0.0_f64; DIM];
    for k in 0..DIM {
        dv[k] = along * n[k];
    }
    dv
}

/// Contact for `(a, b)` if their centers are closer than `diameter`.
///
/// Coincident centers have no defined normal and are skipped.
pub fn pair_contact(i: usize, j: usize, a: &Particle, b: &Particle, diameter: f64) -> Option<Contact> {
    let mut d = [0.0_f64; DIM];
    for k in 0..DIM {
        d[k] = a.r[k] - b.r[k];
    }
    let dist_sq = dot(&d, &d);
    if dist_sq >= diameter * diameter {
        return None;
    }
    let dist = dist_sq.sqrt();
    if dist == 0.0 {
        return None;
    }
    let mut n = d;
    for nk in &mut n {
        *nk /= dist;
    }

    let half_overlap = 0.5 * (diameter - dist);
    let mut dr = [0.0_f64; DIM];
    for k in 0..DIM {
        dr[k] = n[k] * half_overlap;
    }
    Some(Contact {
        i,
        j,
        dv: normal_transfer(&a.v, &b.v, &n),
        dr,
    })
}

/// All contacts owned by flat cell `c`: intra-cell pairs plus pairs with the
/// lexicographically greater neighbors.
pub fn detect_cell(grid: &SpatialGrid, particles: &[Particle], c: usize, diameter: f64) -> Vec<Contact> {
    let home = grid.occupants_at(c);
    if home.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (a, &i) in home.iter().enumerate() {
        for &j in &home[a + 1..] {
            if let Some(contact) = pair_contact(i, j, &particles[i], &particles[j], diameter) {
                out.push(contact);
            }
        }
    }
    let key = grid.key(c);
    for other in grid.forward_neighbors(key) {
        for &i in home {
            for &j in grid.occupants(other) {
                if let Some(contact) = pair_contact(i, j, &particles[i], &particles[j], diameter) {
                    out.push(contact);
                }
            }
        }
    }
    out
}

/// Fold contacts into the particles in order.
pub fn apply_contacts(particles: &mut [Particle], contacts: &[Contact]) {
    for c in contacts {
        for k in 0..DIM {
            particles[c.i].v[k] -= c.dv[k];
            particles[c.j].v[k] += c.dv[k];
            particles[c.i].r[k] += c.dr[k];
            particles[c.j].r[k] -= c.dr[k];
        }
    }
}

/// Advance one active particle by its velocity and reflect it off the box.
///
/// On each axis, touching or crossing a face forces the velocity component
/// to point inward and pins the position onto the face.
pub fn integrate(p: &mut Particle, bounds: &Bounds) {
    for k in 0..DIM {
        p.r[k] += p.v[k];
        let (lo, hi) = bounds.axis_range(k);
        if p.r[k] <= lo {
            p.v[k] = p.v[k].abs();
            p.r[k] = lo;
        } else if p.r[k] >= hi {
            p.v[k] = -p.v[k].abs();
            p.r[k] = hi;
        }
    }
}
