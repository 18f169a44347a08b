//! Runtime choice among a compile-time list of host policies.
//!
//! A `MultiPolicy` pairs a selector with a tuple of policies. The selector
//! looks at the segment and returns an offset into the tuple; every policy
//! in the tuple is instantiated ahead of time, so the runtime choice costs
//! one comparison chain.

use std::marker::PhantomData;

use super::HostPolicy;
use crate::error::LaunchError;
use crate::index::Segment;
use crate::kernel::forall_segment;

/// A tuple of host policies, addressed by offset.
pub trait PolicyList {
    const COUNT: usize;

    /// Names of the policies, in offset order.
    fn describe() -> Vec<String>;

    /// Run a 1-D loop over `segment` with the policy at `offset`.
    fn invoke<Sg, F>(offset: usize, segment: &Sg, body: &F) -> Result<(), LaunchError>
    where
        Sg: Segment,
        F: Fn(i64) + Sync;
}

macro_rules! policy_list {
    ($count:expr; $($idx:tt => $P:ident),+) => {
        impl<$($P: HostPolicy),+> PolicyList for ($($P,)+) {
            const COUNT: usize = $count;

            fn describe() -> Vec<String> {
                vec![$($P::name()),+]
            }

            fn invoke<Sg, F>(offset: usize, segment: &Sg, body: &F) -> Result<(), LaunchError>
            where
                Sg: Segment,
                F: Fn(i64) + Sync,
            {
                $(
                    if offset == $idx {
                        forall_segment::<$P, _, _>(segment, body);
                        return Ok(());
                    }
                )+
                Err(LaunchError::UnknownPolicy {
                    offset,
                    count: Self::COUNT,
                })
            }
        }
    };
}

policy_list!(1; 0 => P0);
policy_list!(2; 0 => P0, 1 => P1);
policy_list!(3; 0 => P0, 1 => P1, 2 => P2);
policy_list!(4; 0 => P0, 1 => P1, 2 => P2, 3 => P3);

/// Selects one of the policies in `L` per call.
pub struct MultiPolicy<Sel, L> {
    selector: Sel,
    _policies: PhantomData<fn() -> L>,
}

impl<Sel, L: PolicyList> MultiPolicy<Sel, L> {
    pub fn new(selector: Sel) -> Self {
        Self {
            selector,
            _policies: PhantomData,
        }
    }

    /// Run `body` over `segment` with the policy the selector picks.
    /// Returns the selected offset.
    pub fn forall_segment<Sg, F>(&self, segment: &Sg, body: F) -> Result<usize, LaunchError>
    where
        Sg: Segment,
        Sel: Fn(&Sg) -> usize,
        F: Fn(i64) + Sync,
    {
        let offset = (self.selector)(segment);
        tracing::debug!(offset, policies = ?L::describe(), "multi-policy selection");
        L::invoke(offset, segment, &body)?;
        Ok(offset)
    }
}
