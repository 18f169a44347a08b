//! Statement types: the nodes of a kernel policy tree.
//!
//! A policy is a statement list (a tuple of statements) built entirely
//! from types:
//!
//! ```text
//! type Policy = (
//!     For<1, SeqExec, (
//!         For<0, ParExec, (Lambda<0>,)>,
//!     )>,
//! );
//! ```
//!
//! Executors for these types live in `host` (CPU) and `simt` (emulated
//! device). Which executor applies is resolved by trait selection at
//! compile time.

use std::fmt::Write;
use std::marker::PhantomData;

use crate::policy::PolicyName;

/// Loop over argument `ARG` with policy `P`, running `Enclosed` per index.
pub struct For<const ARG: usize, P, Enclosed = ()>(PhantomData<fn() -> (P, Enclosed)>);

/// `For` that also writes the loop counter into param slot `PARAM`.
pub struct ForICount<const ARG: usize, const PARAM: usize, P, Enclosed = ()>(
    PhantomData<fn() -> (P, Enclosed)>,
);

/// Invoke loop body `I` with the current indices.
pub struct Lambda<const I: usize>;

/// A top-level kernel policy is just its statement list.
pub type KernelPolicy<L> = L;

// ─── Describe ─────────────────────────────────────────────────────

/// Render a statement tree as indented text, one statement per line.
pub trait Describe {
    fn describe_into(out: &mut String, depth: usize);

    fn describe() -> String {
        let mut out = String::new();
        Self::describe_into(&mut out, 0);
        out
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "{:width$}{}", "", text, width = depth * 2);
}

impl Describe for () {
    fn describe_into(_out: &mut String, _depth: usize) {}
}

macro_rules! describe_tuple {
    ($($S:ident),+) => {
        impl<$($S: Describe),+> Describe for ($($S,)+) {
            fn describe_into(out: &mut String, depth: usize) {
                $( $S::describe_into(out, depth); )+
            }
        }
    };
}

describe_tuple!(S0);
describe_tuple!(S0, S1);
describe_tuple!(S0, S1, S2);
describe_tuple!(S0, S1, S2, S3);
describe_tuple!(S0, S1, S2, S3, S4);
describe_tuple!(S0, S1, S2, S3, S4, S5);

impl<const ARG: usize, P: PolicyName, E: Describe> For<ARG, P, E> {
    pub(crate) fn head() -> String {
        format!("For<{}, {}>", ARG, P::name())
    }
}

impl<const ARG: usize, const PARAM: usize, P: PolicyName, E: Describe> ForICount<ARG, PARAM, P, E> {
    pub(crate) fn head() -> String {
        format!("ForICount<{}, param {}, {}>", ARG, PARAM, P::name())
    }
}

impl<const ARG: usize, P: PolicyName, E: Describe> Describe for For<ARG, P, E> {
    fn describe_into(out: &mut String, depth: usize) {
        line(out, depth, &Self::head());
        E::describe_into(out, depth + 1);
    }
}

impl<const ARG: usize, const PARAM: usize, P: PolicyName, E: Describe> Describe
    for ForICount<ARG, PARAM, P, E>
{
    fn describe_into(out: &mut String, depth: usize) {
        line(out, depth, &Self::head());
        E::describe_into(out, depth + 1);
    }
}

impl<const I: usize> Describe for Lambda<I> {
    fn describe_into(out: &mut String, depth: usize) {
        line(out, depth, &format!("Lambda<{}>", I));
    }
}
